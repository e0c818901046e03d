// src/exec/facade.rs

//! Convenience operations on top of the engine.
//!
//! - [`ExecContext::run`] lets the child use our own stdin/stdout/stderr,
//!   for tools that report progress interactively.
//! - [`ExecContext::capture_text`] / [`ExecContext::capture_lines`] run
//!   through the engine and hand back stdout only, warning about any
//!   stderr text.

use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{info, warn};

use crate::context::ExecContext;
use crate::errors::Result;
use crate::exec::engine::{check_outcome, split_argv, RunFailure};
use crate::journal::{LogEntry, LoggedOutcome};
use crate::types::{ExitOutcome, Invocation};

impl ExecContext {
    /// Run a command attached to the caller's standard streams.
    ///
    /// Nothing is captured; the log entry carries label, argv and status
    /// only.
    pub async fn run<I, S>(&mut self, label: &str, argv: I) -> Result<ExitOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation::new(label, argv);
        info!(label = %label, command = %invocation.command_line(), "running command (passthrough)");

        let status = match wait_passthrough(&invocation).await {
            Ok(status) => status,
            Err(failure) => {
                warn!(label = %label, error = %failure, "passthrough command did not complete");
                self.record(LogEntry::new(
                    &invocation,
                    LoggedOutcome::Failed(failure.to_string()),
                ));
                return Err(failure.into_error(&invocation, invocation.command_line()));
            }
        };

        let outcome = ExitOutcome::from(status);
        info!(label = %label, status = %outcome, "command finished");
        self.record(LogEntry::new(&invocation, LoggedOutcome::Finished(outcome)));

        check_outcome(&invocation, outcome, None)?;
        Ok(outcome)
    }

    /// Run a command and return its stdout as one string.
    pub async fn capture_text<I, S>(&mut self, label: &str, argv: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation::new(label, argv);
        let output = self.execute(&invocation).await?;

        let stderr = output.stderr_text();
        if !stderr.is_empty() {
            warn!(label = %label, stderr = %stderr, "command wrote to stderr");
        }

        Ok(output.stdout.unwrap_or_default())
    }

    /// Run a command and iterate its stdout line by line.
    pub async fn capture_lines<I, S>(&mut self, label: &str, argv: I) -> Result<CapturedLines>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let text = self.capture_text(label, argv).await?;
        Ok(CapturedLines::new(text))
    }
}

async fn wait_passthrough(
    invocation: &Invocation,
) -> std::result::Result<ExitStatus, RunFailure> {
    let (program, args) = split_argv(invocation).map_err(RunFailure::Spawn)?;
    let mut child = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .spawn()
        .map_err(RunFailure::Spawn)?;
    child.wait().await.map_err(RunFailure::Pipe)
}

/// Lazy iterator over the lines of captured output.
///
/// Lines are split on `\n`; a trailing `\r` is dropped. Empty output yields
/// no lines.
#[derive(Debug, Clone)]
pub struct CapturedLines {
    text: String,
    pos: usize,
}

impl CapturedLines {
    pub fn new(text: String) -> Self {
        Self { text, pos: 0 }
    }

    /// The full captured text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Iterator for CapturedLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.pos >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;

        Some(line.strip_suffix('\r').unwrap_or(line).to_string())
    }
}
