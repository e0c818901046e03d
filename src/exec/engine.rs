// src/exec/engine.rs

//! Subprocess execution engine.
//!
//! One call spawns one child with stdin, stdout and stderr all piped, feeds
//! the optional input, drains both output pipes concurrently, reaps the
//! child and decodes its status.
//!
//! The two output pipes are multiplexed in a single `tokio::select!` loop:
//! whichever pipe the reactor reports readable is read into its own
//! accumulator, and a pipe is dropped (closed and deregistered) as soon as
//! it hangs up. Reading them one after the other would deadlock as soon as
//! the child filled the pipe not being read.

use std::fmt;
use std::io;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, trace, warn};

use crate::context::ExecContext;
use crate::errors::{CmdpipeError, Result};
use crate::journal::{LogEntry, LoggedOutcome};
use crate::types::{chomp_output, ExecOutput, ExitOutcome, Invocation};

const CHUNK_SIZE: usize = 8192;

impl ExecContext {
    /// Run `invocation` with all three standard streams piped.
    ///
    /// On success both `stdout` and `stderr` of the returned `ExecOutput`
    /// are `Some`, possibly empty, with one trailing newline removed.
    /// Exactly one log entry is recorded (in verbose mode) whatever the
    /// outcome.
    pub async fn execute(&mut self, invocation: &Invocation) -> Result<ExecOutput> {
        let command = invocation.command_line();
        info!(label = %invocation.label, command = %command, "running command");

        let run = match run_piped(invocation).await {
            Ok(run) => run,
            Err(failure) => {
                warn!(label = %invocation.label, error = %failure, "command did not complete");
                self.record(LogEntry::new(
                    invocation,
                    LoggedOutcome::Failed(failure.to_string()),
                ));
                return Err(failure.into_error(invocation, command));
            }
        };

        info!(
            label = %invocation.label,
            status = %run.outcome,
            stdout_bytes = run.stdout.len(),
            stderr_bytes = run.stderr.len(),
            "command finished"
        );

        let logged = match run.write_error {
            Some(ref e) => LoggedOutcome::InputFailed {
                outcome: run.outcome,
                reason: e.to_string(),
            },
            None => LoggedOutcome::Finished(run.outcome),
        };
        self.record(LogEntry::new(invocation, logged).with_output(
            Some(String::from_utf8_lossy(&run.stdout).into_owned()),
            Some(String::from_utf8_lossy(&run.stderr).into_owned()),
        ));

        let stdout = chomp_output(&run.stdout);
        let stderr = chomp_output(&run.stderr);

        if let Some(source) = run.write_error {
            return Err(CmdpipeError::StreamWrite {
                label: invocation.label.clone(),
                command,
                outcome: run.outcome,
                source,
            });
        }

        check_outcome(invocation, run.outcome, Some(stderr.clone()))?;

        Ok(ExecOutput {
            status: run.outcome,
            stdout: Some(stdout),
            stderr: Some(stderr),
        })
    }
}

/// Map a decoded status to `Ok(())` for exit code 0, or to the matching
/// `AbnormalExit` / `Signaled` error.
pub(crate) fn check_outcome(
    invocation: &Invocation,
    outcome: ExitOutcome,
    stderr: Option<String>,
) -> Result<()> {
    match outcome {
        ExitOutcome::Exited(0) => Ok(()),
        ExitOutcome::Exited(code) => Err(CmdpipeError::AbnormalExit {
            label: invocation.label.clone(),
            command: invocation.command_line(),
            code,
            stderr,
        }),
        ExitOutcome::Signaled {
            signal,
            core_dumped,
        } => Err(CmdpipeError::Signaled {
            label: invocation.label.clone(),
            command: invocation.command_line(),
            signal,
            core_dumped,
            stderr,
        }),
    }
}

/// Split `argv` into program and arguments; an empty argv cannot be spawned.
pub(crate) fn split_argv(invocation: &Invocation) -> io::Result<(&String, &[String])> {
    invocation.argv.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector")
    })
}

/// Where a run failed before a status could be decoded.
#[derive(Debug)]
pub(crate) enum RunFailure {
    Spawn(io::Error),
    Pipe(io::Error),
}

impl RunFailure {
    pub(crate) fn into_error(self, invocation: &Invocation, command: String) -> CmdpipeError {
        let label = invocation.label.clone();
        match self {
            RunFailure::Spawn(source) => CmdpipeError::Spawn {
                label,
                command,
                source,
            },
            RunFailure::Pipe(source) => CmdpipeError::Pipe {
                label,
                command,
                source,
            },
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Spawn(e) => write!(f, "spawn failed: {e}"),
            RunFailure::Pipe(e) => write!(f, "pipe failed: {e}"),
        }
    }
}

/// Everything collected from a child that was spawned and reaped.
#[derive(Debug)]
struct PipedRun {
    outcome: ExitOutcome,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    write_error: Option<io::Error>,
}

async fn run_piped(invocation: &Invocation) -> std::result::Result<PipedRun, RunFailure> {
    let (program, args) = split_argv(invocation).map_err(RunFailure::Spawn)?;

    // tokio closes the child's copies of the parent-side ends (and ours of
    // the child-side ends) as part of spawning.
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(RunFailure::Spawn)?;

    debug!(label = %invocation.label, pid = ?child.id(), "child spawned");

    let stdin = child.stdin.take();
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunFailure::Pipe(missing_pipe("stdout")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunFailure::Pipe(missing_pipe("stderr")))?;

    let write_error = feed_input(stdin, invocation.input_bytes()).await.err();
    if let Some(ref e) = write_error {
        warn!(label = %invocation.label, error = %e, "writing child input failed");
    }

    let (stdout, stderr) = drain(stdout, stderr).await.map_err(RunFailure::Pipe)?;

    let status = child.wait().await.map_err(RunFailure::Pipe)?;

    Ok(PipedRun {
        outcome: ExitOutcome::from(status),
        stdout,
        stderr,
        write_error,
    })
}

fn missing_pipe(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, format!("child {name} pipe missing"))
}

/// Write the whole payload, then close stdin so the child sees end-of-input.
///
/// Without a payload stdin is closed straight away.
async fn feed_input(stdin: Option<ChildStdin>, payload: Option<Vec<u8>>) -> io::Result<()> {
    let (Some(mut pipe), Some(payload)) = (stdin, payload) else {
        return Ok(());
    };
    pipe.write_all(&payload).await?;
    pipe.flush().await?;
    drop(pipe);
    Ok(())
}

/// One output pipe and the bytes read from it so far.
///
/// `pipe` becomes `None` once the child hangs up.
struct PipeDrain<R> {
    name: &'static str,
    pipe: Option<R>,
    chunk: Vec<u8>,
    data: Vec<u8>,
}

impl<R: AsyncRead + Unpin> PipeDrain<R> {
    fn new(name: &'static str, pipe: R) -> Self {
        Self {
            name,
            pipe: Some(pipe),
            chunk: vec![0; CHUNK_SIZE],
            data: Vec::new(),
        }
    }

    fn is_open(&self) -> bool {
        self.pipe.is_some()
    }

    /// Wait until the pipe is readable and read what is available.
    ///
    /// Never resolves for a closed pipe.
    async fn read_ready(&mut self) -> io::Result<usize> {
        match self.pipe.as_mut() {
            Some(pipe) => pipe.read(&mut self.chunk).await,
            None => std::future::pending().await,
        }
    }

    fn absorb(&mut self, read: io::Result<usize>) -> io::Result<()> {
        match read {
            Ok(0) => {
                self.pipe = None;
                trace!(stream = self.name, bytes = self.data.len(), "pipe hung up");
                Ok(())
            }
            Ok(n) => {
                self.data.extend_from_slice(&self.chunk[..n]);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Read stdout and stderr to end-of-stream, whichever is ready first.
async fn drain(stdout: ChildStdout, stderr: ChildStderr) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let mut out = PipeDrain::new("stdout", stdout);
    let mut err = PipeDrain::new("stderr", stderr);

    while out.is_open() || err.is_open() {
        tokio::select! {
            read = out.read_ready(), if out.is_open() => out.absorb(read)?,
            read = err.read_ready(), if err.is_open() => err.absorb(read)?,
        }
    }

    Ok((out.data, err.data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_collects_both_pipes_of_a_real_child() {
        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg("echo out; echo err >&2; echo more")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let stdout = child.stdout.take().unwrap();
        let stderr = child.stderr.take().unwrap();
        let (out, err) = drain(stdout, stderr).await.unwrap();
        child.wait().await.unwrap();

        assert_eq!(out, b"out\nmore\n");
        assert_eq!(err, b"err\n");
    }

    #[tokio::test]
    async fn feed_input_without_payload_closes_stdin() {
        let mut child = Command::new("/bin/cat")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();

        feed_input(child.stdin.take(), None).await.unwrap();
        let output = child.wait_with_output().await.unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn empty_argv_is_rejected() {
        let inv = Invocation::new("nothing", Vec::<String>::new());
        let err = split_argv(&inv).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn check_outcome_maps_statuses() {
        let inv = Invocation::new("t", ["/bin/false"]);
        assert!(check_outcome(&inv, ExitOutcome::Exited(0), None).is_ok());

        let err = check_outcome(&inv, ExitOutcome::Exited(7), None).unwrap_err();
        assert_eq!(err.exit_code(), Some(7));

        let err = check_outcome(
            &inv,
            ExitOutcome::Signaled {
                signal: 9,
                core_dumped: false,
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.signal(), Some(9));
    }
}
