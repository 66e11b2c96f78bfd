//! Diagnostics log.
//!
//! The terminal belongs to the TUI, so tracing output goes to a file in the
//! logs directory instead.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Paths;

/// Installs the global subscriber.
///
/// Filter precedence: `level_override` (from `--log-level`), then
/// `RUST_LOG`, then `default_level` from the config file.
pub fn init(paths: &Paths, level_override: Option<&str>, default_level: &str) -> Result<()> {
    fs::create_dir_all(paths.logs_dir())?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.diagnostics_log())?;

    let filter = match level_override {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;

    tracing::info!(version = crate::constants::APP_VERSION, "starting");
    Ok(())
}
