// src/config/mod.rs

//! Configuration loading for cmdpipe.
//!
//! - [`model`] holds the serde types mirroring the TOML file.
//! - [`loader`] reads files and picks the default path.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ConfigSection, ProgramConfig, RawConfigFile, RetrySection};
