use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Decoded termination status of a child process.
///
/// - `Exited(code)`: the child called `exit` itself; `0` is success.
/// - `Signaled`: the child was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signaled { signal: i32, core_dumped: bool },
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitOutcome::Exited(code) => Some(*code),
            ExitOutcome::Signaled { .. } => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitOutcome::Signaled { signal, .. } => Some(*signal),
            ExitOutcome::Exited(_) => None,
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            ExitOutcome::Exited(code)
        } else if let Some(signal) = status.signal() {
            ExitOutcome::Signaled {
                signal,
                core_dumped: status.core_dumped(),
            }
        } else {
            // Stopped/continued states are never reported by a plain wait.
            ExitOutcome::Exited(status.into_raw())
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit status {code}"),
            ExitOutcome::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "signal {signal} (core dumped)"),
            ExitOutcome::Signaled { signal, .. } => write!(f, "signal {signal}"),
        }
    }
}

/// One request to run an external program.
///
/// `argv[0]` is the program path; the rest are its arguments. When `input`
/// is set, each line is written to the child's stdin followed by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub argv: Vec<String>,
    pub input: Option<Vec<String>>,
}

impl Invocation {
    pub fn new<I, S>(label: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            argv: argv.into_iter().map(Into::into).collect(),
            input: None,
        }
    }

    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// The command line as a single space-joined string, for messages.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Bytes written to the child's stdin, or `None` when no input was given.
    pub fn input_bytes(&self) -> Option<Vec<u8>> {
        self.input.as_ref().map(|lines| {
            let mut payload = Vec::new();
            for line in lines {
                payload.extend_from_slice(line.as_bytes());
                payload.push(b'\n');
            }
            payload
        })
    }
}

/// Result of a successful engine run.
///
/// `stdout` / `stderr` are `Some` whenever the stream was captured, even if
/// the child wrote nothing to it. `None` means the stream was not captured
/// at all (passthrough).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub status: ExitOutcome,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecOutput {
    /// Captured stderr, treating "not captured" and "empty" alike.
    pub fn stderr_text(&self) -> &str {
        self.stderr.as_deref().unwrap_or("")
    }

    pub fn stdout_text(&self) -> &str {
        self.stdout.as_deref().unwrap_or("")
    }
}

/// Decode captured bytes and drop exactly one trailing newline.
pub fn chomp_output(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}
