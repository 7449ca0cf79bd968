//! Common utilities for all binaries.
//!
//! Shared CLI parsing and logging setup, following the workspace template's
//! `bog-bins::common` module.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Common CLI arguments for the service binaries.
///
/// Every setting this crate cares about is normally read straight from the
/// environment by each service's own `*Config::from_env()` (`spec.md` §6);
/// `--log-level` is the one flag every binary shares.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Log level (also overridable with `RUST_LOG`)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Initialize `tracing` logging.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    Ok(())
}
