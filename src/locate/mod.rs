// src/locate/mod.rs

//! Program name resolution.
//!
//! - [`locator`] owns the `ProgramLocator`: cache, env override and
//!   directory search.
//! - [`env`] abstracts environment-variable lookup so overrides can be
//!   exercised without mutating the process environment.

pub mod env;
pub mod locator;

pub use env::{EnvSource, ProcessEnv};
pub use locator::{override_var_name, ProgramLocator, DEFAULT_SEARCH_DIRS};
