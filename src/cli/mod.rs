//! cli
//!
//! Command-line interface layer for leetpush.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Load configuration and delegate to command handlers
//!
//! The CLI layer is thin. Pushing goes through [`crate::push::PushService`];
//! handlers only build it from configuration and print the result.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LEETPUSH_LOG";

/// Shared state for command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    pub debug: bool,
    pub quiet: bool,
    pub config: Config,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Send `tracing` events to stderr.
///
/// `--debug` shows this crate's debug events; otherwise `$LEETPUSH_LOG`
/// is used as the filter, defaulting to warnings only.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("leetpush=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Already installed when run twice in one process, as in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
