//! Hierarchical extract scheduler.
//!
//! Walks the catalog into sibling batches, then runs them on a fixed pool of
//! workers sharing one batch queue and one completion registry. A batch whose
//! parent region is not finished yet goes back to the end of the queue; the
//! worker sleeps for the backoff interval before popping again.

mod plan;
mod pool;
mod progress;
mod queue;
mod registry;
mod worker;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::catalog::{Batch, CatalogIndex, CatalogWalker, Layout};
use crate::config::SplitConfig;
use crate::engine::ExtractionEngine;
use crate::error::SchedulerError;

pub use plan::{Plan, PlannedBatch};
pub use progress::{RunSummary, SchedulerEvent};
pub use queue::BatchQueue;
pub use registry::CompletionRegistry;

use worker::SchedulerContext;

/// Catalog walker configured from `cfg`.
pub fn walker(cfg: &SplitConfig) -> CatalogWalker {
    CatalogWalker::new(
        cfg.catalog_dir.clone(),
        cfg.boundary_extension.clone(),
        cfg.effective_batch_size(),
    )
}

/// Dry run: walk the catalog and resolve every batch's source. Writes nothing.
pub fn plan(cfg: &SplitConfig) -> Result<Plan, SchedulerError> {
    cfg.validate()?;
    let batches = walker(cfg).collect()?;
    let index = CatalogIndex::build(&batches);
    Ok(Plan::build(&batches, &index, &Layout::from_config(cfg)))
}

/// Runs extracts for a catalog with an injected engine.
pub struct Scheduler {
    config: SplitConfig,
    engine: Arc<dyn ExtractionEngine>,
    registry: Arc<CompletionRegistry>,
    events: Option<mpsc::Sender<SchedulerEvent>>,
}

impl Scheduler {
    pub fn new(config: SplitConfig, engine: Arc<dyn ExtractionEngine>) -> Self {
        Self {
            config,
            engine,
            registry: Arc::new(CompletionRegistry::new()),
            events: None,
        }
    }

    /// Send progress events to `tx` during the run.
    pub fn with_events(mut self, tx: mpsc::Sender<SchedulerEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Registry the run will record completions in; lets callers observe it
    /// during and after the run, including after a failure.
    pub fn registry(&self) -> Arc<CompletionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Walk the catalog and extract everything. Does not look at `dry_run`;
    /// callers wanting a dry run use [`plan`].
    pub async fn run(self) -> Result<RunSummary, SchedulerError> {
        self.config.validate()?;
        let batches = walker(&self.config).collect()?;
        self.run_batches(batches).await
    }

    /// Extract pre-computed batches (walk order must put ancestors first).
    pub async fn run_batches(self, batches: Vec<Batch>) -> Result<RunSummary, SchedulerError> {
        let started = Instant::now();
        let index = CatalogIndex::build(&batches);
        tracing::info!(
            "scheduling {} task(s) in {} batch(es) on {} worker(s)",
            index.len(),
            batches.len(),
            self.config.max_concurrent
        );

        let ctx = Arc::new(SchedulerContext {
            queue: BatchQueue::new(),
            registry: self.registry,
            index,
            layout: Layout::from_config(&self.config),
            engine: self.engine,
            mode: self.config.cut_mode,
            boundary_kind: self.config.boundary_kind,
            backoff: self.config.requeue_backoff(),
            events: self.events,
        });
        for batch in batches {
            ctx.queue.push(batch);
        }

        let totals = pool::run_pool(Arc::clone(&ctx), self.config.max_concurrent).await?;

        let summary = RunSummary {
            batches: totals.batches,
            tasks: totals.tasks,
            requeues: totals.requeues,
            elapsed: started.elapsed(),
            finished: ctx.registry.snapshot(),
        };
        tracing::info!(
            "run finished: {} batch(es), {} task(s), {} requeue(s) in {:?}",
            summary.batches,
            summary.tasks,
            summary.requeues,
            summary.elapsed
        );
        Ok(summary)
    }
}
