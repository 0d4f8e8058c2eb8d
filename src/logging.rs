//! Tracing setup.
//!
//! The REPL and the TUI own the terminal, so by default log records go to
//! `~/.cache/sleuth/sleuth.log`. `--verbose` sends them to stderr instead and
//! raises the default level to debug. `RUST_LOG` overrides either filter.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::constants::DEFAULT_LOG_FILTER;

const VERBOSE_LOG_FILTER: &str = "sleuth=debug";

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

/// Installs the global subscriber. Call once, before any command runs.
pub fn init(verbose: bool) -> Result<()> {
    if verbose {
        tracing_subscriber::registry()
            .with(filter(true))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(());
    }

    let path = Config::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
