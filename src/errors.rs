// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! Every engine failure names the invocation label and, where one exists,
//! the numeric exit code or signal number.

use thiserror::Error;

use crate::types::ExitOutcome;

#[derive(Error, Debug)]
pub enum CmdpipeError {
    #[error("{label}: failed to spawn `{command}`: {source}")]
    Spawn {
        label: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{label}: `{command}` exited with status {code}")]
    AbnormalExit {
        label: String,
        command: String,
        code: i32,
        stderr: Option<String>,
    },

    #[error("{label}: `{command}` killed by signal {signal}{}", core_note(.core_dumped))]
    Signaled {
        label: String,
        command: String,
        signal: i32,
        core_dumped: bool,
        stderr: Option<String>,
    },

    #[error("program '{name}' not found; set {env_var} to its path")]
    UnresolvedProgram { name: String, env_var: String },

    #[error("{label}: writing input to `{command}` failed ({outcome}): {source}")]
    StreamWrite {
        label: String,
        command: String,
        outcome: ExitOutcome,
        #[source]
        source: std::io::Error,
    },

    #[error("{label}: pipe failure while running `{command}`: {source}")]
    Pipe {
        label: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CmdpipeError {
    /// Exit code of an abnormal exit, if that is what this error is.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CmdpipeError::AbnormalExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Signal number of a signal termination, if that is what this error is.
    pub fn signal(&self) -> Option<i32> {
        match self {
            CmdpipeError::Signaled { signal, .. } => Some(*signal),
            _ => None,
        }
    }
}

fn core_note(core_dumped: &bool) -> &'static str {
    if *core_dumped { " (core dumped)" } else { "" }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdpipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abnormal_exit_message_names_label_and_code() {
        let err = CmdpipeError::AbnormalExit {
            label: "fail-test".to_string(),
            command: "/bin/sh -c exit 3".to_string(),
            code: 3,
            stderr: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("fail-test"));
        assert!(msg.contains("status 3"));
        assert_eq!(err.exit_code(), Some(3));
        assert_eq!(err.signal(), None);
    }

    #[test]
    fn signal_message_mentions_core_dump_only_when_set() {
        let plain = CmdpipeError::Signaled {
            label: "sig".to_string(),
            command: "sleep 10".to_string(),
            signal: 15,
            core_dumped: false,
            stderr: None,
        };
        assert!(plain.to_string().ends_with("killed by signal 15"));

        let dumped = CmdpipeError::Signaled {
            label: "sig".to_string(),
            command: "sleep 10".to_string(),
            signal: 6,
            core_dumped: true,
            stderr: None,
        };
        assert!(dumped.to_string().contains("signal 6 (core dumped)"));
        assert_eq!(dumped.signal(), Some(6));
    }

    #[test]
    fn unresolved_program_names_override_variable() {
        let err = CmdpipeError::UnresolvedProgram {
            name: "mkfs.ext4".to_string(),
            env_var: "MKFS_EXT4_PROG".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mkfs.ext4"));
        assert!(msg.contains("MKFS_EXT4_PROG"));
    }
}
