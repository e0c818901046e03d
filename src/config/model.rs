// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::retry::RetryPolicy;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// verbose = true
/// search_dirs = ["/usr/sbin", "/sbin"]
///
/// [retry]
/// attempts = 3
/// delay = "1s"
/// retryable_codes = [1]
///
/// [program.mkfs-ext4]
/// path = "/sbin/mkfs.ext4"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub retry: RetrySection,

    /// Program path overrides from `[program.<name>]`, keyed by logical name.
    #[serde(default)]
    pub program: BTreeMap<String, ProgramConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Record every invocation in the execution log and dump it on failure.
    #[serde(default)]
    pub verbose: bool,

    /// Replaces the locator's default search directories when non-empty.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

/// `[retry]` section, used by `cmdpipe exec` when no CLI flags override it.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts, e.g. `"500ms"` or `"2s"`.
    #[serde(default = "default_delay")]
    pub delay: String,

    /// Exit codes worth retrying. Empty means any nonzero code.
    #[serde(default)]
    pub retryable_codes: Vec<i32>,
}

fn default_attempts() -> u32 {
    1
}

fn default_delay() -> String {
    "1s".to_string()
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay: default_delay(),
            retryable_codes: Vec::new(),
        }
    }
}

/// `[program.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    pub path: PathBuf,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (or
/// `Default`), so the retry policy is always well formed.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub retry: RetryPolicy,
    pub program: BTreeMap<String, ProgramConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        retry: RetryPolicy,
        program: BTreeMap<String, ProgramConfig>,
    ) -> Self {
        Self {
            config,
            retry,
            program,
        }
    }
}
