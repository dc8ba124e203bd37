//! File-based diagnostics.
//!
//! The TUI owns the terminal, so tracing output goes to a log file under the
//! user data directory. Transport failures and discarded stale replies are
//! visible here and nowhere in the conversation itself.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::{log_path, Config};

/// Install the global subscriber. Filter precedence: `EDUCHAT_LOG` env var,
/// then the config file, then "info".
pub fn init(config: &Config) -> Result<()> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env("EDUCHAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or("info"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
