//! Guidestore - local framework guide sync and name resolution
//!
//! Main entry point

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use guidestore_core::{GuideService, StoreContext};

mod guides_cli;

use guides_cli::GuidesCommand;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "guidestore",
    about = "Sync framework guides locally and look them up by name",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: GuidesCommand,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    json_logs: bool,

    /// Override the config root (defaults to $GUIDESTORE_HOME or the platform config dir)
    #[clap(long, global = true)]
    config_root: Option<PathBuf>,
}

fn initialize_tracing(log_level: &LogLevel, json_logs: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if json_logs {
        // JSON output - MUST go to stderr
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        // Standard text output - MUST go to stderr
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.json_logs);

    let ctx = match cli.config_root {
        Some(root) => StoreContext::new(root),
        None => StoreContext::discover()?,
    };
    debug!("Using config root {}", ctx.root().display());

    let service = GuideService::new(ctx).context("Failed to initialize guide store")?;
    cli.command.execute(&service)
}
