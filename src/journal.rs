// src/journal.rs

//! Append-only record of every invocation made through an `ExecContext`.
//!
//! The log is only written to when the context runs in verbose mode. It is
//! never read by the engine itself; callers dump it when an operation fails
//! so the whole command history is available for diagnosis.

use std::fmt;

use crate::types::{ExitOutcome, Invocation};

/// How an invocation ended, as far as the log is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggedOutcome {
    /// The child ran and was reaped.
    Finished(ExitOutcome),
    /// The child ran and was reaped, but writing its input failed.
    InputFailed { outcome: ExitOutcome, reason: String },
    /// The child could not be spawned, or its pipes failed before reaping.
    Failed(String),
}

impl LoggedOutcome {
    /// Decoded status, when the child was reaped.
    pub fn exit_outcome(&self) -> Option<ExitOutcome> {
        match self {
            LoggedOutcome::Finished(outcome) | LoggedOutcome::InputFailed { outcome, .. } => {
                Some(*outcome)
            }
            LoggedOutcome::Failed(_) => None,
        }
    }
}

/// One recorded invocation.
///
/// Captured text is stored exactly as read from the pipes. `None` means the
/// stream was not captured (passthrough runs, spawn failures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub label: String,
    pub argv: Vec<String>,
    pub input: Option<Vec<String>>,
    pub outcome: LoggedOutcome,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl LogEntry {
    pub fn new(invocation: &Invocation, outcome: LoggedOutcome) -> Self {
        Self {
            label: invocation.label.clone(),
            argv: invocation.argv.clone(),
            input: invocation.input.clone(),
            outcome,
            stdout: None,
            stderr: None,
        }
    }

    pub fn with_output(mut self, stdout: Option<String>, stderr: Option<String>) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.outcome.exit_outcome().and_then(|o| o.code())
    }

    pub fn signal(&self) -> Option<i32> {
        self.outcome.exit_outcome().and_then(|o| o.signal())
    }

    pub fn core_dumped(&self) -> bool {
        matches!(
            self.outcome.exit_outcome(),
            Some(ExitOutcome::Signaled {
                core_dumped: true,
                ..
            })
        )
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.label, self.argv.join(" "))?;
        match &self.outcome {
            LoggedOutcome::Finished(outcome) => writeln!(f, "  status: {outcome}")?,
            LoggedOutcome::InputFailed { outcome, reason } => {
                writeln!(f, "  status: {outcome}")?;
                writeln!(f, "  input write failed: {reason}")?;
            }
            LoggedOutcome::Failed(reason) => writeln!(f, "  failed: {reason}")?,
        }
        if let Some(ref input) = self.input {
            write_block(f, "stdin", &input.join("\n"))?;
        }
        if let Some(ref stdout) = self.stdout {
            write_block(f, "stdout", stdout)?;
        }
        if let Some(ref stderr) = self.stderr {
            write_block(f, "stderr", stderr)?;
        }
        Ok(())
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, name: &str, text: &str) -> fmt::Result {
    if text.is_empty() {
        return writeln!(f, "  {name}: <empty>");
    }
    writeln!(f, "  {name}:")?;
    for line in text.lines() {
        writeln!(f, "    | {line}")?;
    }
    Ok(())
}

/// Append-only list of `LogEntry`s.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every entry, oldest first, as a diagnostic dump.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExecutionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "execution log ({} entries):", self.entries.len())?;
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
