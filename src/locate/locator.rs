// src/locate/locator.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::errors::{CmdpipeError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::locate::env::{EnvSource, ProcessEnv};

/// Directories searched, in order, when no override applies.
pub const DEFAULT_SEARCH_DIRS: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9]+").expect("static regex is valid"));

/// Name of the environment variable that overrides the path of `name`.
///
/// `"mkfs.ext4"` becomes `MKFS_EXT4_PROG`, `"sfdisk"` becomes `SFDISK_PROG`.
pub fn override_var_name(name: &str) -> String {
    let collapsed = NON_ALNUM_RUN.replace_all(name, "_");
    format!("{}_PROG", collapsed.to_uppercase())
}

/// Resolves logical program names to absolute executable paths.
///
/// Lookup order (first match wins):
/// 1. the cache (including paths seeded from config),
/// 2. the `<NAME>_PROG` environment variable, if it names an executable,
/// 3. the search directories, in order.
///
/// Cache entries are never overwritten or invalidated.
#[derive(Debug, Clone)]
pub struct ProgramLocator {
    cache: HashMap<String, PathBuf>,
    search_dirs: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
    env: Arc<dyn EnvSource>,
}

impl Default for ProgramLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramLocator {
    /// Locator over the real filesystem and process environment.
    pub fn new() -> Self {
        Self::with_backends(Arc::new(RealFileSystem), Arc::new(ProcessEnv))
    }

    pub fn with_backends(fs: Arc<dyn FileSystem>, env: Arc<dyn EnvSource>) -> Self {
        Self {
            cache: HashMap::new(),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            fs,
            env,
        }
    }

    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Cached path for `name`, without probing anything.
    pub fn cached(&self, name: &str) -> Option<&Path> {
        self.cache.get(name).map(PathBuf::as_path)
    }

    /// Pin `name` to `path` ahead of any lookup.
    ///
    /// Returns `Ok(false)` without touching the filesystem if `name` is
    /// already cached. Fails if `path` is not an executable file.
    pub fn seed(&mut self, name: &str, path: impl Into<PathBuf>) -> Result<bool> {
        if self.cache.contains_key(name) {
            debug!(program = %name, "program already cached; keeping existing path");
            return Ok(false);
        }

        let path = path.into();
        if !self.fs.is_executable(&path) {
            return Err(CmdpipeError::ConfigError(format!(
                "override for program '{}' is not an executable file: {}",
                name,
                path.display()
            )));
        }

        debug!(program = %name, path = %path.display(), "seeded program path");
        self.cache.insert(name.to_string(), path);
        Ok(true)
    }

    /// Resolve `name` to an executable path, caching the result.
    pub fn resolve(&mut self, name: &str) -> Result<PathBuf> {
        if let Some(path) = self.cache.get(name) {
            return Ok(path.clone());
        }

        let path = self
            .probe(name)
            .ok_or_else(|| CmdpipeError::UnresolvedProgram {
                name: name.to_string(),
                env_var: override_var_name(name),
            })?;

        info!(program = %name, path = %path.display(), "resolved program");
        self.cache.insert(name.to_string(), path.clone());
        Ok(path)
    }

    fn probe(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains('/') {
            return None;
        }

        let var = override_var_name(name);
        if let Some(value) = self.env.var(&var) {
            let candidate = PathBuf::from(&value);
            if candidate.is_absolute() && self.fs.is_executable(&candidate) {
                return Some(candidate);
            }
            warn!(
                program = %name,
                variable = %var,
                value = %value,
                "override does not name an absolute executable file; ignoring"
            );
        }

        self.search_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| self.fs.is_executable(candidate))
    }
}
