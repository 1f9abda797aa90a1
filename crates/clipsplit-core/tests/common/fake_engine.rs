//! Deterministic stand-in for the splitter binary.
//!
//! Parses the job list it is given, writes an empty file per destination, and
//! records what it saw, including whether the batch's parent was already in
//! the completion registry when the invocation started.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use clipsplit_core::catalog::TaskId;
use clipsplit_core::config::CutMode;
use clipsplit_core::engine::ExtractionEngine;
use clipsplit_core::error::EngineError;
use clipsplit_core::scheduler::CompletionRegistry;

#[derive(Debug, Clone)]
pub struct Call {
    pub tasks: Vec<String>,
    pub source: PathBuf,
    pub job_list: PathBuf,
    pub mode: CutMode,
    /// `None` when reading the master dataset, else whether the parent was finished.
    pub parent_finished: Option<bool>,
}

pub struct FakeEngine {
    catalog_dir: PathBuf,
    boundary_extension: String,
    master: PathBuf,
    delay: Duration,
    fail_on: Option<String>,
    registry: OnceLock<Arc<CompletionRegistry>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight count however `extract` returns.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeEngine {
    pub fn new(catalog_dir: &Path, master: &Path) -> Self {
        Self {
            catalog_dir: catalog_dir.to_path_buf(),
            boundary_extension: ".poly".to_string(),
            master: master.to_path_buf(),
            delay: Duration::ZERO,
            fail_on: None,
            registry: OnceLock::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail any invocation whose job list contains `task`.
    pub fn failing_on(mut self, task: &str) -> Self {
        self.fail_on = Some(task.to_string());
        self
    }

    pub fn observe(&self, registry: Arc<CompletionRegistry>) {
        let _ = self.registry.set(registry);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of `extract` calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn dispatched_tasks(&self) -> Vec<String> {
        self.calls().into_iter().flat_map(|c| c.tasks).collect()
    }

    fn task_for_boundary(&self, boundary: &str) -> String {
        let rel = Path::new(boundary)
            .strip_prefix(&self.catalog_dir)
            .unwrap()
            .to_string_lossy()
            .to_string();
        rel.strip_suffix(self.boundary_extension.as_str())
            .unwrap()
            .to_string()
    }
}

impl ExtractionEngine for FakeEngine {
    fn extract(&self, source: &Path, job_list: &Path, mode: CutMode) -> Result<(), EngineError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let content = fs::read_to_string(job_list).map_err(|e| EngineError::Failed(e.to_string()))?;
        let mut tasks = Vec::new();
        let mut destinations = Vec::new();
        for line in content.lines().filter(|l| !l.starts_with('#') && !l.is_empty()) {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3, "malformed job line: {line}");
            destinations.push(PathBuf::from(fields[0]));
            tasks.push(self.task_for_boundary(fields[2]));
        }

        let parent_finished = if source == self.master {
            None
        } else {
            let parent = TaskId::new(tasks[0].clone()).parent().expect("child task");
            Some(
                self.registry
                    .get()
                    .map(|r| r.is_finished(&parent))
                    .unwrap_or(false),
            )
        };

        self.calls.lock().unwrap().push(Call {
            tasks: tasks.clone(),
            source: source.to_path_buf(),
            job_list: job_list.to_path_buf(),
            mode,
            parent_finished,
        });

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(bad) = &self.fail_on {
            if tasks.iter().any(|t| t == bad) {
                return Err(EngineError::Failed(format!("simulated failure on {bad}")));
            }
        }
        for dest in destinations {
            fs::write(&dest, b"").map_err(|e| EngineError::Failed(e.to_string()))?;
        }
        Ok(())
    }
}
