//! The external extraction engine, seen as a single capability.
//!
//! The scheduler only needs "extract these outputs from this source"; tests
//! substitute a deterministic fake for the real splitter binary.

mod command;

use std::path::Path;

use crate::config::CutMode;
use crate::error::EngineError;

pub use command::{resolve_program, CommandEngine};

/// Runs one extraction over a job-list file. Blocking; called from the blocking pool.
pub trait ExtractionEngine: Send + Sync {
    fn extract(&self, source: &Path, job_list: &Path, mode: CutMode) -> Result<(), EngineError>;
}
