#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use cmdpipe::fs::mock::MockFileSystem;
use cmdpipe::{ExecContext, ProgramLocator};

/// Builder for an `ExecContext` over a mock filesystem and a fixed
/// environment, so locator behaviour can be tested without touching the
/// real system.
pub struct ContextBuilder {
    fs: MockFileSystem,
    env: HashMap<String, String>,
    search_dirs: Option<Vec<String>>,
    verbose: bool,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            env: HashMap::new(),
            search_dirs: None,
            verbose: false,
        }
    }

    pub fn with_executable(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_executable(path);
        self
    }

    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_file(path);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn search_dir(mut self, dir: &str) -> Self {
        self.search_dirs
            .get_or_insert_with(Vec::new)
            .push(dir.to_string());
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.verbose = val;
        self
    }

    /// Handle on the mock filesystem, e.g. to read its probe counter.
    pub fn filesystem(&self) -> MockFileSystem {
        self.fs.clone()
    }

    pub fn build(self) -> ExecContext {
        let mut locator = ProgramLocator::with_backends(Arc::new(self.fs), Arc::new(self.env));
        if let Some(dirs) = self.search_dirs {
            locator = locator.with_search_dirs(dirs);
        }
        ExecContext::new(locator, self.verbose)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
