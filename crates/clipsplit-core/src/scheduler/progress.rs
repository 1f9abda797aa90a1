//! Progress reporting for a run (dispatches, requeues, completions) and the final summary.
//!
//! Events go to the CLI over an optional channel; the summary is returned by `Scheduler::run`.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::TaskId;

/// Something a worker did with a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Engine started on `tasks`, reading `source`.
    Dispatched {
        batch: usize,
        worker: usize,
        tasks: Vec<TaskId>,
        source: PathBuf,
    },
    /// Parent not finished yet; the batch went to the back of the queue.
    Requeued { batch: usize, waiting_for: TaskId },
    /// Engine returned successfully and the tasks were marked finished.
    Completed {
        batch: usize,
        tasks: Vec<TaskId>,
        elapsed: Duration,
    },
}

/// Per-worker counters, merged into `RunSummary`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WorkerStats {
    pub batches: usize,
    pub tasks: usize,
    pub requeues: usize,
}

impl WorkerStats {
    pub fn merge(&mut self, other: WorkerStats) {
        self.batches += other.batches;
        self.tasks += other.tasks;
        self.requeues += other.requeues;
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Engine invocations that succeeded.
    pub batches: usize,
    /// Tasks marked finished.
    pub tasks: usize,
    /// Times a batch was pushed back because its parent was not finished.
    pub requeues: usize,
    pub elapsed: Duration,
    /// Final completion registry, sorted.
    pub finished: Vec<TaskId>,
}

impl RunSummary {
    /// Extracts per second over the whole run (0 if elapsed is 0).
    pub fn tasks_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.tasks as f64 / secs
    }
}
