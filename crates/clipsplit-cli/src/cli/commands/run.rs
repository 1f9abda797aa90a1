//! `clipsplit run` – extract every region, parents before children.

use anyhow::{Context, Result};
use clipsplit_core::config::SplitConfig;
use clipsplit_core::engine::CommandEngine;
use clipsplit_core::scheduler::{Scheduler, SchedulerEvent};
use std::sync::Arc;

fn print_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::Dispatched {
            batch,
            worker,
            tasks,
            source,
        } => {
            let names: Vec<&str> = tasks.iter().map(|t| t.as_str()).collect();
            println!(
                "[worker {}] splitting {} to #{} [{}]",
                worker,
                source.display(),
                batch,
                names.join(", ")
            );
        }
        SchedulerEvent::Requeued { batch, waiting_for } => {
            println!("  #{} waits for {}, requeued", batch, waiting_for);
        }
        SchedulerEvent::Completed {
            batch,
            tasks,
            elapsed,
        } => {
            println!(
                "  #{} finished {} extract(s) in {:.1}s",
                batch,
                tasks.len(),
                elapsed.as_secs_f64()
            );
        }
    }
}

pub async fn run_scheduler(cfg: SplitConfig) -> Result<()> {
    let engine = CommandEngine::from_config(&cfg)?;
    tracing::debug!(engine = %engine.program().display(), "resolved engine");

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<SchedulerEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let result = Scheduler::new(cfg, Arc::new(engine))
        .with_events(event_tx)
        .run()
        .await;
    let _ = printer.await;

    let summary = result.context("run aborted")?;
    if summary.batches == 0 {
        println!("No clipbounds found.");
    } else {
        println!(
            "Done: {} extract(s) in {} batch(es), {} requeue(s), {:.1}s ({:.2} extracts/s)",
            summary.tasks,
            summary.batches,
            summary.requeues,
            summary.elapsed.as_secs_f64(),
            summary.tasks_per_sec()
        );
    }
    Ok(())
}
