//! Conductor — run project build tasks together with their dependencies.
//!
//! # Usage
//!
//! ```text
//! conductor [TARGET]...            # default target: `default`
//! conductor build[cs] test[--extra]
//! conductor -T                     # list task descriptions
//! conductor -C <dir> -f <config.yaml> clean
//! ```

mod config;
mod recipe;
mod target;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use config::ProjectConfig;
use target::parse_target;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "conductor",
    version,
    about = "Run project build tasks with their dependencies",
    long_about = None,
)]
struct Cli {
    /// Tasks to run, as `name` or `name[arg1,arg2]`.
    #[arg(value_name = "TARGET")]
    targets: Vec<String>,

    /// Project configuration file.
    #[arg(long, short = 'f', default_value = "conductor.yaml")]
    file: PathBuf,

    /// Change to this directory before doing anything.
    #[arg(long, short = 'C')]
    directory: Option<PathBuf>,

    /// List tasks with descriptions and exit.
    #[arg(long, short = 'T')]
    tasks: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change directory to '{}'", dir.display()))?;
    }

    let config = ProjectConfig::load(&cli.file)
        .with_context(|| format!("failed to load '{}'", cli.file.display()))?;
    let registry =
        recipe::build_registry(Arc::new(config)).context("failed to register build tasks")?;

    if cli.tasks {
        print!("{}{}", recipe::USAGE, registry.describe());
        return Ok(());
    }

    let targets = if cli.targets.is_empty() {
        vec!["default".to_string()]
    } else {
        cli.targets
    };

    for raw in &targets {
        let target = parse_target(raw)?;
        let summary = conductor_core::run_blocking(&registry, &target.name, &target.args)
            .with_context(|| format!("target '{}' failed", target.name))?;
        tracing::debug!(
            run_target = %summary.target,
            tasks = ?summary.executed,
            elapsed_ms = summary.duration.as_millis() as u64,
            "run complete"
        );
        println!(
            "{} '{}' ({} task(s) in {:.2}s)",
            "✓".green(),
            summary.target,
            summary.executed.len(),
            summary.duration.as_secs_f64()
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
