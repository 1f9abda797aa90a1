//! Logging setup.
//!
//! `run` appends to `clipsplit.log` under the XDG state dir so a long extraction
//! session leaves a record of every dispatch and requeue. `plan`, dry runs and
//! `init-config` log to stderr and create nothing on disk.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "clipsplit.log";

const DEFAULT_FILTER: &str = "info,clipsplit_core=debug,clipsplit=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Location of the run log, creating the state directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clipsplit")?;
    Ok(xdg_dirs.place_state_file(LOG_FILE_NAME)?)
}

/// Append structured logs to the run log. Returns its path.
/// On failure nothing is installed, so the caller can fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("clipsplit run log at {}", path.display());
    Ok(path)
}

/// Log to stderr only.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Logging for an extraction run: the run log when it can be opened, stderr otherwise.
pub fn init_run_logging() -> Option<PathBuf> {
    match init_logging() {
        Ok(path) => Some(path),
        Err(e) => {
            init_logging_stderr();
            tracing::warn!("run log unavailable, logging to stderr: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
