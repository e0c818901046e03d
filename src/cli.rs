// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cmdpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdpipe",
    version,
    about = "Run external tools with captured output and decoded exit status.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Cmdpipe.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Keep an execution log and dump it if the command fails.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run a command with all streams captured; print stdout and stderr.
    Exec(ExecArgs),
    /// Run a command attached to this terminal.
    Run(CommandArgs),
    /// Run a command and print its stdout only.
    Capture(CaptureArgs),
    /// Print the resolved path of one or more programs.
    Resolve {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
}

/// Label, program and arguments shared by every running subcommand.
///
/// A `PROGRAM` without a `/` is resolved through the program locator.
#[derive(Debug, Clone, Args)]
pub struct CommandArgs {
    /// Label recorded in logs and error messages.
    pub label: String,

    pub program: String,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// Feed the lines of this file to the command's stdin.
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Total attempts; overrides `[retry].attempts`.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Delay between attempts (e.g. "500ms", "2s"); overrides `[retry].delay`.
    #[arg(long, value_name = "DURATION")]
    pub retry_delay: Option<String>,

    #[command(flatten)]
    pub command: CommandArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CaptureArgs {
    /// Print stdout as numbered lines.
    #[arg(long)]
    pub lines: bool,

    #[command(flatten)]
    pub command: CommandArgs,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_keeps_hyphenated_program_arguments() {
        let args = CliArgs::try_parse_from([
            "cmdpipe",
            "exec",
            "--retries",
            "3",
            "probe",
            "sfdisk",
            "--dump",
            "/dev/sda",
        ])
        .unwrap();

        match args.command {
            CliCommand::Exec(exec) => {
                assert_eq!(exec.retries, Some(3));
                assert_eq!(exec.command.label, "probe");
                assert_eq!(exec.command.program, "sfdisk");
                assert_eq!(exec.command.args, vec!["--dump", "/dev/sda"]);
            }
            other => panic!("expected exec, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["cmdpipe", "resolve", "mount", "--verbose"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, CliCommand::Resolve { ref names } if names == &["mount"]));
    }

    #[test]
    fn resolve_requires_a_name() {
        assert!(CliArgs::try_parse_from(["cmdpipe", "resolve"]).is_err());
    }
}
