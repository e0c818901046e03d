// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CmdpipeError, Result};
use crate::exec::retry::{parse_duration, RetryPolicy};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CmdpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_search_dirs(&raw)?;
        validate_programs(&raw)?;
        let retry = build_retry_policy(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, retry, raw.program))
    }
}

fn validate_search_dirs(cfg: &RawConfigFile) -> Result<()> {
    for dir in cfg.config.search_dirs.iter() {
        if !dir.is_absolute() {
            return Err(CmdpipeError::ConfigError(format!(
                "[config].search_dirs entry '{}' must be an absolute path",
                dir.display()
            )));
        }
    }
    Ok(())
}

fn validate_programs(cfg: &RawConfigFile) -> Result<()> {
    for (name, program) in cfg.program.iter() {
        if name.trim().is_empty() {
            return Err(CmdpipeError::ConfigError(
                "[program.<name>] sections need a non-empty name".to_string(),
            ));
        }
        if !program.path.is_absolute() {
            return Err(CmdpipeError::ConfigError(format!(
                "[program.{}].path '{}' must be an absolute path",
                name,
                program.path.display()
            )));
        }
    }
    Ok(())
}

fn build_retry_policy(cfg: &RawConfigFile) -> Result<RetryPolicy> {
    let retry = &cfg.retry;

    if retry.attempts == 0 {
        return Err(CmdpipeError::ConfigError(
            "[retry].attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    let delay = parse_duration(&retry.delay).map_err(|e| {
        CmdpipeError::ConfigError(format!("[retry].delay '{}': {}", retry.delay, e))
    })?;

    if let Some(code) = retry.retryable_codes.iter().find(|c| !(1..=255).contains(*c)) {
        return Err(CmdpipeError::ConfigError(format!(
            "[retry].retryable_codes entry {} is outside 1..=255",
            code
        )));
    }

    Ok(RetryPolicy {
        attempts: retry.attempts,
        delay,
        retryable_codes: retry.retryable_codes.clone(),
    })
}
