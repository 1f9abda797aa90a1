//! One worker: pop a batch, check its parent, dispatch or requeue.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::catalog::{Batch, CatalogIndex, Layout, TaskId};
use crate::config::{BoundaryKind, CutMode};
use crate::engine::ExtractionEngine;
use crate::error::SchedulerError;
use crate::joblist::JobList;

use super::progress::{SchedulerEvent, WorkerStats};
use super::queue::BatchQueue;
use super::registry::CompletionRegistry;

/// Everything the workers of one run share.
pub(crate) struct SchedulerContext {
    pub queue: BatchQueue,
    pub registry: Arc<CompletionRegistry>,
    pub index: CatalogIndex,
    pub layout: Layout,
    pub engine: Arc<dyn ExtractionEngine>,
    pub mode: CutMode,
    pub boundary_kind: BoundaryKind,
    pub backoff: Duration,
    pub events: Option<mpsc::Sender<SchedulerEvent>>,
}

impl SchedulerContext {
    async fn emit(&self, event: SchedulerEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

/// Worker loop. Returns when the queue is closed or aborted; an engine failure
/// aborts the queue so no other worker dispatches anything new.
pub(crate) async fn run_worker(
    ctx: Arc<SchedulerContext>,
    worker: usize,
) -> Result<WorkerStats, SchedulerError> {
    let mut stats = WorkerStats::default();
    while let Some(batch) = ctx.queue.pop().await {
        let result = process_batch(&ctx, worker, batch, &mut stats).await;
        if let Err(e) = result {
            tracing::error!(worker, "{e}");
            ctx.queue.abort();
            ctx.queue.task_done();
            return Err(e);
        }
        ctx.queue.task_done();
    }
    tracing::debug!(worker, "worker exiting");
    Ok(stats)
}

async fn process_batch(
    ctx: &SchedulerContext,
    worker: usize,
    batch: Batch,
    stats: &mut WorkerStats,
) -> Result<(), SchedulerError> {
    let dependency: Option<TaskId> = ctx.index.dependency_of(&batch).cloned();

    if let Some(parent) = &dependency {
        if !ctx.registry.is_finished(parent) {
            tracing::info!(
                "batch {} reads {} which is not finished yet, requeueing and sleeping {:?}",
                batch.describe(),
                parent,
                ctx.backoff
            );
            ctx.emit(SchedulerEvent::Requeued {
                batch: batch.id(),
                waiting_for: parent.clone(),
            })
            .await;
            ctx.queue.push(batch);
            stats.requeues += 1;
            tokio::time::sleep(ctx.backoff).await;
            return Ok(());
        }
    }

    let source = ctx.layout.source_for(dependency.as_ref());
    let label = batch.describe();
    let job_list = JobList::build(&batch, &ctx.layout, ctx.boundary_kind);
    let job_file = job_list
        .ensure_destination_dirs()
        .and_then(|()| job_list.write_temp())
        .map_err(|source| SchedulerError::JobList {
            batch: label.clone(),
            source,
        })?;

    tracing::info!(worker, "splitting {} to {}", source.display(), label);
    let tasks: Vec<TaskId> = batch.task_ids().cloned().collect();
    ctx.emit(SchedulerEvent::Dispatched {
        batch: batch.id(),
        worker,
        tasks: tasks.clone(),
        source: source.clone(),
    })
    .await;

    let started = Instant::now();
    let outcome = {
        let engine = Arc::clone(&ctx.engine);
        let source = source.clone();
        let mode = ctx.mode;
        tokio::task::spawn_blocking(move || {
            let res = engine.extract(&source, job_file.path(), mode);
            drop(job_file);
            res
        })
        .await
        .map_err(|e| SchedulerError::Worker(format!("engine task for batch {label}: {e}")))?
    };
    outcome.map_err(|source_err| SchedulerError::EngineFailed {
        batch: label.clone(),
        dataset: source.clone(),
        source: source_err,
    })?;

    ctx.registry.mark_finished(&tasks);
    let elapsed = started.elapsed();
    stats.batches += 1;
    stats.tasks += tasks.len();
    tracing::info!(worker, "finished splitting to {} (runtime {:?})", label, elapsed);
    ctx.emit(SchedulerEvent::Completed {
        batch: batch.id(),
        tasks,
        elapsed,
    })
    .await;
    Ok(())
}
