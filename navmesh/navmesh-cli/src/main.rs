//! Batch runner for the navigation mesh optimizer.
//!
//! # Commands
//!
//! - `navmesh-opt optimize <FILES>...` - Optimize editor exports, time them, compare counts
//! - `navmesh-opt validate <FILES>...` - Optimize and check the output invariants
//!
//! Logging goes to stderr. `RUST_LOG` overrides `--log-level`.

mod optimize;
mod params;
mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::params::ParamArgs;

/// Navigation mesh optimizer
#[derive(Parser)]
#[command(name = "navmesh-opt")]
#[command(about = "Clean raw navigation meshes for pathfinding", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "navmesh_optimize=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize one or more editor exports
    Optimize {
        /// Editor JSON exports
        #[arg(name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Number of runs per file for timing
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,

        /// Write timing rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write each optimized mesh in export format into this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fail if an export's expected counts do not match
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Optimize exports and report invariant violations
    Validate {
        /// Editor JSON exports
        #[arg(name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {level}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Optimize {
            inputs,
            repeat,
            csv,
            output,
            check,
            params,
        } => optimize::run(&optimize::RunOptions {
            inputs,
            repeat,
            csv,
            output,
            check,
            params: params.to_params(),
        }),
        Commands::Validate { inputs, params } => validate::run(&inputs, &params.to_params()),
    }
}
