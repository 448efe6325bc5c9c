// src/launcher.rs

//! Glue between configuration, bundle and process supervision.
//!
//! [`plan`] decides where the bundle goes and which arguments the executable
//! gets; [`supervise`] runs one process through `new → start → wait` and
//! folds the result into a [`LaunchOutcome`].

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::bundle::Bundle;
use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::validate::timeout_from_str;
use crate::context::{CancelHandle, Context, ContextError};
use crate::errors::{Result, TorPrebuiltError};
use crate::process::{ExitReport, OutputMode, ProcessCreator};

/// Exit code reported when the process was killed by cancellation, the
/// conventional `128 + SIGINT`.
pub const KILLED_EXIT_CODE: i32 = 130;

/// What the launcher is about to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub package_name: String,
    pub work_dir: PathBuf,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Exited(ExitReport),
    /// Ran and exited unsuccessfully; `None` when ended by a foreign signal.
    Failed { code: Option<i32> },
    Killed(ContextError),
}

impl LaunchOutcome {
    /// Exit code the launcher binary should return.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Exited(_) => 0,
            LaunchOutcome::Failed { code } => code.unwrap_or(1),
            LaunchOutcome::Killed(_) => KILLED_EXIT_CODE,
        }
    }
}

/// Fold CLI flags into the loaded configuration. Flags win.
pub fn apply_cli_overrides(config: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(dir) = &args.bundle_dir {
        config.bundle_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.work_dir {
        config.work_dir = Some(dir.clone());
    }
    if let Some(timeout) = &args.timeout {
        config.timeout = Some(timeout_from_str("--timeout", timeout)?);
    }
    if let Some(output) = args.output {
        if config.ready_on_stdout.is_some() && output != OutputMode::Log {
            return Err(TorPrebuiltError::Config(format!(
                "--output {output:?} conflicts with [launcher].ready_on_stdout, which needs log output"
            )));
        }
        config.output = output;
    }
    config.args.extend(args.args.iter().cloned());
    Ok(())
}

/// Default working directory: `<temp>/tor-prebuilt/<package name>`.
pub fn default_work_dir(bundle: &Bundle) -> PathBuf {
    std::env::temp_dir()
        .join("tor-prebuilt")
        .join(bundle.package_name())
}

pub fn plan(config: &ConfigFile, bundle: &Bundle) -> LaunchPlan {
    LaunchPlan {
        package_name: bundle.package_name(),
        work_dir: config
            .work_dir
            .clone()
            .unwrap_or_else(|| default_work_dir(bundle)),
        args: config.tor_args(),
        timeout: config.timeout,
    }
}

/// Context for a plan: bounded by its timeout, cancellable either way.
pub fn context_for(plan: &LaunchPlan) -> (Context, CancelHandle) {
    match plan.timeout {
        Some(timeout) => Context::with_timeout(timeout),
        None => Context::with_cancel(),
    }
}

/// Create, start and wait for one process.
///
/// Runtime exits and kills become outcomes; configuration, launch and IO
/// errors are returned as errors.
pub async fn supervise<C>(creator: &C, ctx: Context, args: Vec<String>) -> Result<LaunchOutcome>
where
    C: ProcessCreator + ?Sized,
{
    let mut process = creator.new_process(ctx, args)?;
    process.start()?;

    match process.wait().await {
        Ok(report) => {
            info!(
                pid = report.pid,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "process finished cleanly"
            );
            Ok(LaunchOutcome::Exited(report))
        }
        Err(TorPrebuiltError::RuntimeExit { status }) => {
            warn!(status = %status, "process exited unsuccessfully");
            Ok(LaunchOutcome::Failed {
                code: status.code(),
            })
        }
        Err(TorPrebuiltError::Killed(cause)) => {
            info!(cause = %cause, "process killed");
            Ok(LaunchOutcome::Killed(cause))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn plan_uses_package_dir_by_default() {
        let bundle = Bundle::new("ELF").with_version("0.4.8");
        let plan = plan(&ConfigFile::default(), &bundle);

        assert_eq!(plan.package_name, "tor_0_4_8");
        assert!(plan.work_dir.ends_with("tor-prebuilt/tor_0_4_8"));
        assert_eq!(
            plan.args,
            vec!["-f", "torrc", "--defaults-torrc", "torrc-defaults"]
        );
        assert_eq!(plan.timeout, None);
    }

    #[test]
    fn cli_flags_override_config() {
        let mut config = ConfigFile {
            args: vec!["--SocksPort".to_string(), "9050".to_string()],
            ..ConfigFile::default()
        };
        let args = CliArgs::try_parse_from([
            "tor-prebuilt",
            "--work-dir",
            "/srv/tor",
            "--timeout",
            "100ms",
            "--",
            "--Log",
            "notice stdout",
        ])
        .unwrap();

        apply_cli_overrides(&mut config, &args).unwrap();

        assert_eq!(config.work_dir, Some(PathBuf::from("/srv/tor")));
        assert_eq!(config.timeout, Some(Duration::from_millis(100)));
        assert_eq!(
            config.tor_args()[4..],
            ["--SocksPort", "9050", "--Log", "notice stdout"]
        );
    }

    #[test]
    fn bad_cli_timeout_is_a_config_error() {
        let mut config = ConfigFile::default();
        let args = CliArgs::try_parse_from(["tor-prebuilt", "--timeout", "0ms"]).unwrap();
        assert!(matches!(
            apply_cli_overrides(&mut config, &args),
            Err(TorPrebuiltError::Config(_))
        ));
    }

    #[test]
    fn huge_cli_timeout_does_not_panic() {
        let mut config = ConfigFile::default();
        let args =
            CliArgs::try_parse_from(["tor-prebuilt", "--timeout", "18446744073709551615s"]).unwrap();
        apply_cli_overrides(&mut config, &args).unwrap();

        let plan = plan(&config, &Bundle::new("ELF"));
        let (ctx, _cancel) = context_for(&plan);
        assert_eq!(ctx.deadline(), None);

        let args = CliArgs::try_parse_from(["tor-prebuilt", "--timeout", "999999999999999999m"])
            .unwrap();
        assert!(matches!(
            apply_cli_overrides(&mut config, &args),
            Err(TorPrebuiltError::Config(msg)) if msg.contains("too large")
        ));
    }

    #[test]
    fn cli_output_mode_must_agree_with_ready_pattern() {
        let mut config = ConfigFile::default();
        let args = CliArgs::try_parse_from(["tor-prebuilt", "--output", "null"]).unwrap();
        apply_cli_overrides(&mut config, &args).unwrap();
        assert_eq!(config.output, OutputMode::Null);

        let mut config = ConfigFile {
            output: OutputMode::Log,
            ready_on_stdout: Some(regex::Regex::new("Bootstrapped 100%").unwrap()),
            ..ConfigFile::default()
        };
        let args = CliArgs::try_parse_from(["tor-prebuilt", "--output", "inherit"]).unwrap();
        assert!(apply_cli_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(LaunchOutcome::Failed { code: Some(3) }.exit_code(), 3);
        assert_eq!(LaunchOutcome::Failed { code: None }.exit_code(), 1);
        assert_eq!(
            LaunchOutcome::Killed(ContextError::DeadlineExceeded).exit_code(),
            KILLED_EXIT_CODE
        );
    }
}
