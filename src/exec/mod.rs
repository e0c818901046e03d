// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`engine`] runs one invocation with piped stdin/stdout/stderr and
//!   drains both output pipes concurrently.
//! - [`facade`] adds passthrough runs and stdout-only capture on top.
//! - [`backend`] provides the `CommandRunner` trait, implemented by
//!   `ExecContext` and replaceable by a fake in tests.
//! - [`retry`] wraps a runner in a bounded, fixed-delay retry loop.

pub mod backend;
pub mod engine;
pub mod facade;
pub mod retry;

pub use backend::CommandRunner;
pub use facade::CapturedLines;
pub use retry::{execute_with_retry, parse_duration, RetryPolicy};
