// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::process::OutputMode;

/// Command-line arguments for `tor-prebuilt`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tor-prebuilt",
    version,
    about = "Materialize a bundled Tor executable and run it as a supervised child process.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `TorPrebuilt.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build output directory to load the bundle from (overrides `[bundle].dir`).
    #[arg(long, value_name = "DIR")]
    pub bundle_dir: Option<PathBuf>,

    /// Directory to materialize into and run from (overrides `[launcher].work_dir`).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Kill the process after this long, e.g. `30s` (overrides `[launcher].timeout`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Where the child's output goes: inherit, null or log (overrides
    /// `[launcher].output`).
    #[arg(long, value_name = "MODE")]
    pub output: Option<OutputMode>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TOR_PREBUILT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write the bundle to the working directory, then exit.
    #[arg(long)]
    pub materialize_only: bool,

    /// Print what would be materialized and run, without touching disk.
    #[arg(long)]
    pub dry_run: bool,

    /// Extra arguments passed to the executable, after `--`.
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
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
    fn passthrough_args_follow_double_dash() {
        let args = CliArgs::try_parse_from([
            "tor-prebuilt",
            "--timeout",
            "5s",
            "--",
            "--SocksPort",
            "9050",
        ])
        .unwrap();

        assert_eq!(args.timeout.as_deref(), Some("5s"));
        assert_eq!(args.args, vec!["--SocksPort", "9050"]);
        assert!(!args.dry_run);
        assert_eq!(args.output, None);
    }

    #[test]
    fn output_mode_flag() {
        let args = CliArgs::try_parse_from(["tor-prebuilt", "--output", "LOG"]).unwrap();
        assert_eq!(args.output, Some(OutputMode::Log));
        assert!(CliArgs::try_parse_from(["tor-prebuilt", "--output", "file"]).is_err());
    }
}
