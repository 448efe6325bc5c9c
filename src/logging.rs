// src/logging.rs

//! Logging setup for `tor-prebuilt` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. the `--log-level` CLI flag;
//! 2. `TOR_PREBUILT_LOG`, which takes full `EnvFilter` directives such as
//!    `info,tor_prebuilt::process=debug`;
//! 3. `info`.
//!
//! Logs go to stderr so an inherited child stdout stays clean.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TOR_PREBUILT_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }
    env.filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_env() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn env_directives_are_kept() {
        let filter = build_filter(None, Some("info,tor_prebuilt::process=trace"));
        let rendered = filter.to_string();
        assert!(rendered.contains("tor_prebuilt::process=trace"));
    }

    #[test]
    fn bad_or_missing_env_falls_back_to_info() {
        assert_eq!(build_filter(None, None).to_string(), "info");
        assert_eq!(build_filter(None, Some("  ")).to_string(), "info");
        assert_eq!(build_filter(None, Some("tor_prebuilt=loudest")).to_string(), "info");
    }
}
