// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! Orchestration code (for example [`super::retry::execute_with_retry`])
//! talks to a `CommandRunner` instead of an `ExecContext` directly, so tests
//! can script outcomes without spawning processes.
//!
//! - `ExecContext` is the production implementation; it forwards to the
//!   engine.
//! - The `cmdpipe-test-utils` crate provides a fake runner that records
//!   invocations and replays canned results.

use std::future::Future;
use std::pin::Pin;

use crate::context::ExecContext;
use crate::errors::Result;
use crate::types::{ExecOutput, Invocation};

/// Trait abstracting how an invocation is executed.
pub trait CommandRunner: Send {
    fn run_command<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<ExecOutput>> + Send + 'a>>;
}

impl CommandRunner for ExecContext {
    fn run_command<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<ExecOutput>> + Send + 'a>> {
        Box::pin(self.execute(invocation))
    }
}
