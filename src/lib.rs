// src/lib.rs

pub mod bundle;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod fs;
pub mod launcher;
pub mod logging;
pub mod materialize;
pub mod process;

use anyhow::{Context as _, Result};
use tracing::{debug, info};

use crate::bundle::{Bundle, BundleOptions};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::fs::RealFileSystem;
use crate::launcher::{LaunchPlan, apply_cli_overrides, context_for, plan, supervise};
use crate::process::Creator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - bundle loading (build directory or embedded)
/// - materialization into the working directory
/// - process supervision with timeout and Ctrl-C cancellation
///
/// Returns the exit code for the launcher process.
pub async fn run(args: CliArgs) -> Result<i32> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    apply_cli_overrides(&mut cfg, &args)?;

    let fs = RealFileSystem;
    let bundle = load_bundle(&fs, &cfg)?;
    let plan = plan(&cfg, &bundle);

    if args.dry_run {
        print_dry_run(&cfg, &bundle, &plan);
        return Ok(0);
    }

    let mut creator = Creator::from_bundle(&fs, &bundle, &plan.work_dir)
        .with_context(|| format!("materializing bundle into {:?}", plan.work_dir))?
        .with_output(cfg.output);
    if let Some(re) = cfg.ready_on_stdout.clone() {
        creator = creator.with_ready_pattern(re);
    }

    if args.materialize_only {
        println!("{}", creator.exe().display());
        return Ok(0);
    }

    let (ctx, cancel) = context_for(&plan);

    // Ctrl-C → kill the child and report it as killed.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; cancelling");
        cancel.cancel();
    });

    info!(
        package = %plan.package_name,
        work_dir = ?plan.work_dir,
        timeout_ms = plan.timeout.map(|t| t.as_millis() as u64),
        "launching"
    );

    let outcome = supervise(&creator, ctx, plan.args).await?;
    debug!(?outcome, "supervision finished");
    Ok(outcome.exit_code())
}

fn load_bundle(fs: &RealFileSystem, cfg: &ConfigFile) -> crate::errors::Result<Bundle> {
    let options = BundleOptions {
        rewrite_prefix: cfg.rewrite_prefix.clone(),
    };
    if let Some(dir) = &cfg.bundle_dir {
        return Bundle::from_dir(fs, dir, &options);
    }

    #[cfg(feature = "embedded")]
    {
        Bundle::embedded(&options)
    }

    #[cfg(not(feature = "embedded"))]
    {
        let _ = options;
        Err(crate::errors::TorPrebuiltError::Config(
            "no bundle directory configured (use --bundle-dir or [bundle].dir)".to_string(),
        ))
    }
}

/// Simple dry-run output: print bundle, working directory and arguments.
fn print_dry_run(cfg: &ConfigFile, bundle: &Bundle, plan: &LaunchPlan) {
    println!("tor-prebuilt dry-run");
    println!(
        "  bundle: {} (version {})",
        plan.package_name,
        bundle.version().unwrap_or("unknown")
    );
    println!(
        "  executable: {} bytes, blake3 {}",
        bundle.executable().len(),
        bundle.executable().digest()
    );
    for (path, data) in bundle.assets() {
        println!("  asset: {} ({} bytes)", path.display(), data.len());
    }
    println!("  work_dir: {}", plan.work_dir.display());
    println!("  args: {:?}", plan.args);
    if let Some(timeout) = plan.timeout {
        println!("  timeout: {timeout:?}");
    }
    println!("  output: {:?}", cfg.output);

    debug!("dry-run complete (nothing written)");
}
