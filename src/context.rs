// src/context.rs

//! The owned state every command runs against.
//!
//! `ExecContext` bundles the program path cache (inside the locator), the
//! execution log and the verbose flag. The engine and facade operations are
//! methods on it (see [`crate::exec`]), so each caller holds exactly one
//! mutable handle and no global state exists.

use std::path::PathBuf;

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::journal::{ExecutionLog, LogEntry};
use crate::locate::ProgramLocator;

#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    locator: ProgramLocator,
    journal: ExecutionLog,
    verbose: bool,
}

impl ExecContext {
    pub fn new(locator: ProgramLocator, verbose: bool) -> Self {
        Self {
            locator,
            journal: ExecutionLog::new(),
            verbose,
        }
    }

    /// Build a context over the real filesystem from a validated config.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::from_config_with_locator(cfg, ProgramLocator::new())
    }

    /// Apply `cfg` on top of `locator`: replace its search directories if
    /// the config lists any, then seed every `[program.<name>]` path.
    pub fn from_config_with_locator(cfg: &ConfigFile, locator: ProgramLocator) -> Result<Self> {
        let mut locator = if cfg.config.search_dirs.is_empty() {
            locator
        } else {
            locator.with_search_dirs(cfg.config.search_dirs.iter().cloned())
        };

        for (name, program) in cfg.program.iter() {
            locator.seed(name, &program.path)?;
        }

        debug!(
            verbose = cfg.config.verbose,
            programs = cfg.program.len(),
            "execution context built from config"
        );
        Ok(Self::new(locator, cfg.config.verbose))
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn locator(&self) -> &ProgramLocator {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut ProgramLocator {
        &mut self.locator
    }

    pub fn journal(&self) -> &ExecutionLog {
        &self.journal
    }

    /// Resolve a logical program name through the locator.
    pub fn resolve(&mut self, name: &str) -> Result<PathBuf> {
        self.locator.resolve(name)
    }

    /// Append `entry` to the execution log if verbose mode is on.
    pub(crate) fn record(&mut self, entry: LogEntry) {
        if self.verbose {
            self.journal.record(entry);
        }
    }
}
