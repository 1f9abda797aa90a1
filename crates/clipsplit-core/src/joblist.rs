//! Job-list files consumed by the engine.
//!
//! One line per task: `<destination>\t<KIND>\t<boundary file>`. Lines starting
//! with `#` are ignored by the engine.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::catalog::{Batch, Layout};
use crate::config::BoundaryKind;

const HEADER: &str = "# auto-generated\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub destination: PathBuf,
    pub kind: BoundaryKind,
    pub boundary: PathBuf,
}

/// Engine input for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobList {
    entries: Vec<JobEntry>,
}

impl JobList {
    pub fn build(batch: &Batch, layout: &Layout, kind: BoundaryKind) -> Self {
        let entries = batch
            .task_ids()
            .map(|id| JobEntry {
                destination: layout.output_path(id),
                kind,
                boundary: layout.boundary_path(id),
            })
            .collect();
        Self { entries }
    }

    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for e in &self.entries {
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                e.destination.display(),
                e.kind.token(),
                e.boundary.display()
            ));
        }
        out
    }

    /// Create every destination's parent directory. Safe to race with other workers.
    pub fn ensure_destination_dirs(&self) -> io::Result<()> {
        for e in &self.entries {
            if let Some(dir) = e.destination.parent() {
                create_dir_if_absent(dir)?;
            }
        }
        Ok(())
    }

    /// Write the rendered list to a temp file, deleted when the handle is dropped.
    pub fn write_temp(&self) -> io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("clipsplit-jobs-")
            .suffix(".conf")
            .tempfile()?;
        file.write_all(self.render().as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

fn create_dir_if_absent(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    tracing::debug!("creating {}", dir.display());
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}
