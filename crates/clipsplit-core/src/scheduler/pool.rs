//! Run the worker pool until every batch is extracted or one fails.
//!
//! Spawns `workers` tasks sharing one context, waits for the queue to drain,
//! then closes it and collects the workers.

use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

use crate::error::SchedulerError;

use super::progress::WorkerStats;
use super::worker::{run_worker, SchedulerContext};

type WorkerResult = Result<Result<WorkerStats, SchedulerError>, JoinError>;

pub(crate) async fn run_pool(
    ctx: Arc<SchedulerContext>,
    workers: usize,
) -> Result<WorkerStats, SchedulerError> {
    let workers = workers.max(1);
    let mut join_set = JoinSet::new();
    for worker in 0..workers {
        join_set.spawn(run_worker(Arc::clone(&ctx), worker));
    }
    tracing::debug!("started {} worker(s)", workers);

    let mut totals = WorkerStats::default();
    let mut first_error: Option<SchedulerError> = None;

    // Workers only exit early on failure; watch for that while waiting for the drain.
    loop {
        tokio::select! {
            _ = ctx.queue.join() => break,
            Some(res) = join_set.join_next() => {
                record(&ctx, res, &mut totals, &mut first_error);
            }
        }
    }

    ctx.queue.close();
    while let Some(res) = join_set.join_next().await {
        record(&ctx, res, &mut totals, &mut first_error);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(totals),
    }
}

fn record(
    ctx: &SchedulerContext,
    res: WorkerResult,
    totals: &mut WorkerStats,
    first_error: &mut Option<SchedulerError>,
) {
    let err = match res {
        Ok(Ok(stats)) => {
            totals.merge(stats);
            return;
        }
        Ok(Err(e)) => e,
        Err(e) => {
            ctx.queue.abort();
            SchedulerError::Worker(format!("worker join: {e}"))
        }
    };
    if first_error.is_none() {
        *first_error = Some(err);
    }
}
