// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod journal;
pub mod locate;
pub mod logging;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::cli::{CaptureArgs, CliArgs, CliCommand, CommandArgs, ExecArgs};
use crate::config::{load_or_default, ConfigFile};
use crate::exec::{execute_with_retry, parse_duration, RetryPolicy};

pub use crate::context::ExecContext;
pub use crate::errors::{CmdpipeError, Result as CmdpipeResult};
pub use crate::journal::{ExecutionLog, LogEntry, LoggedOutcome};
pub use crate::locate::ProgramLocator;
pub use crate::types::{ExecOutput, ExitOutcome, Invocation};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, builds the `ExecContext`, runs the requested
/// subcommand and, in verbose mode, dumps the execution log to stderr if
/// the subcommand fails.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref()).context("loading configuration")?;

    let mut ctx = ExecContext::from_config(&cfg)?;
    if args.verbose {
        ctx.set_verbose(true);
    }

    let result = dispatch(&mut ctx, &cfg, args.command).await;

    if let Err(ref err) = result {
        error!(error = %err, "command failed");
        if ctx.verbose() {
            eprintln!("{}", ctx.journal().dump());
        }
    }

    result
}

async fn dispatch(ctx: &mut ExecContext, cfg: &ConfigFile, command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Exec(exec) => run_exec(ctx, cfg, exec).await,
        CliCommand::Run(cmd) => {
            let argv = resolve_argv(ctx, &cmd)?;
            ctx.run(&cmd.label, argv).await?;
            Ok(())
        }
        CliCommand::Capture(capture) => run_capture(ctx, capture).await,
        CliCommand::Resolve { names } => {
            for name in names {
                let path = ctx.resolve(&name)?;
                println!("{}\t{}", name, path.display());
            }
            Ok(())
        }
    }
}

async fn run_exec(ctx: &mut ExecContext, cfg: &ConfigFile, exec: ExecArgs) -> Result<()> {
    let argv = resolve_argv(ctx, &exec.command)?;
    let mut invocation = Invocation::new(exec.command.label.clone(), argv);
    if let Some(ref path) = exec.input_file {
        invocation = invocation.with_input(read_input_lines(path)?);
    }

    let policy = retry_policy(cfg, &exec)?;
    debug!(?policy, "retry policy for exec");

    let output = execute_with_retry(ctx, &invocation, &policy).await?;

    let stdout = output.stdout_text();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    let stderr = output.stderr_text();
    if !stderr.is_empty() {
        eprintln!("{stderr}");
    }
    Ok(())
}

async fn run_capture(ctx: &mut ExecContext, capture: CaptureArgs) -> Result<()> {
    let argv = resolve_argv(ctx, &capture.command)?;

    if capture.lines {
        let lines = ctx.capture_lines(&capture.command.label, argv).await?;
        for (idx, line) in lines.enumerate() {
            println!("{:>4}  {}", idx + 1, line);
        }
    } else {
        let text = ctx.capture_text(&capture.command.label, argv).await?;
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

/// Build argv, resolving a bare program name through the locator.
fn resolve_argv(ctx: &mut ExecContext, cmd: &CommandArgs) -> Result<Vec<String>> {
    let program = if cmd.program.contains('/') {
        cmd.program.clone()
    } else {
        ctx.resolve(&cmd.program)?.to_string_lossy().into_owned()
    };

    let mut argv = Vec::with_capacity(cmd.args.len() + 1);
    argv.push(program);
    argv.extend(cmd.args.iter().cloned());
    Ok(argv)
}

fn read_input_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading input file {:?}", path))?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// `[retry]` from the config, with CLI flags taking precedence.
fn retry_policy(cfg: &ConfigFile, exec: &ExecArgs) -> Result<RetryPolicy> {
    let mut policy = cfg.retry.clone();

    if let Some(attempts) = exec.retries {
        policy.attempts = attempts.max(1);
    }
    if let Some(ref delay) = exec.retry_delay {
        policy.delay = parse_duration(delay)
            .map_err(|e| anyhow::anyhow!("invalid --retry-delay '{}': {}", delay, e))?;
    }

    Ok(policy)
}
