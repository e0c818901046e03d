// src/exec/retry.rs

//! Bounded retry with a fixed delay, for commands expected to fail
//! transiently (re-reading a partition table right after writing it, for
//! instance). The engine itself never retries.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::errors::{CmdpipeError, Result};
use crate::exec::backend::CommandRunner;
use crate::types::{ExecOutput, Invocation};

/// How often and how patiently to retry one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first; at least 1.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Exit codes worth retrying. Empty means any nonzero code.
    pub retryable_codes: Vec<i32>,
}

impl Default for RetryPolicy {
    /// A single attempt; nothing is retried.
    fn default() -> Self {
        Self {
            attempts: 1,
            delay: Duration::from_secs(1),
            retryable_codes: Vec::new(),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
            retryable_codes: Vec::new(),
        }
    }

    pub fn with_retryable_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.retryable_codes = codes.into_iter().collect();
        self
    }

    /// Whether `err` is worth another attempt under this policy.
    ///
    /// Only abnormal exits (with a listed code) and signal terminations are
    /// retried; spawn, pipe, input and lookup failures are not.
    pub fn is_retryable(&self, err: &CmdpipeError) -> bool {
        match err {
            CmdpipeError::AbnormalExit { code, .. } => {
                self.retryable_codes.is_empty() || self.retryable_codes.contains(code)
            }
            CmdpipeError::Signaled { .. } => true,
            _ => false,
        }
    }
}

/// Execute `invocation` through `runner`, retrying per `policy`.
///
/// Returns the first success, the first non-retryable error, or the error
/// of the last attempt.
pub async fn execute_with_retry<R>(
    runner: &mut R,
    invocation: &Invocation,
    policy: &RetryPolicy,
) -> Result<ExecOutput>
where
    R: CommandRunner + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match runner.run_command(invocation).await {
            Ok(output) => {
                if attempt > 1 {
                    info!(label = %invocation.label, attempt, "command succeeded after retry");
                }
                return Ok(output);
            }
            Err(err) if attempt < attempts && policy.is_retryable(&err) => {
                warn!(
                    label = %invocation.label,
                    attempt,
                    attempts,
                    error = %err,
                    delay = ?policy.delay,
                    "command failed; retrying"
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
