//! Error taxonomy for planning and running extracts.
//!
//! Configuration problems are fatal before any dispatch, engine failures are
//! fatal to the whole run. A batch whose parent is not finished yet is not an
//! error at all; the worker pool requeues it.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Startup errors: reported before any batch is dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog directory not found: {}", .0.display())]
    MissingCatalog(PathBuf),

    #[error("catalog path is not a directory: {}", .0.display())]
    CatalogNotDirectory(PathBuf),

    #[error("extraction engine not found or not executable: {}", .0.display())]
    MissingEngine(PathBuf),

    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

/// Failure of one engine invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}", program.display())]
    Exit { program: PathBuf, status: ExitStatus },

    /// Used by non-process engines (and tests) to report a failed extraction.
    #[error("{0}")]
    Failed(String),
}

/// Errors that abort a plan or run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("walking catalog at {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preparing job list for batch {batch}: {source}")]
    JobList {
        batch: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extracting batch {batch} from {}: {source}", dataset.display())]
    EngineFailed {
        batch: String,
        dataset: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("worker task failed: {0}")]
    Worker(String),
}
