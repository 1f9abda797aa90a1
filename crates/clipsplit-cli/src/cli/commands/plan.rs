//! `clipsplit plan` – print the batches and where each one reads from.

use anyhow::{Context, Result};
use clipsplit_core::config::SplitConfig;
use clipsplit_core::scheduler::{self, Plan};

fn print_plan(plan: &Plan) {
    println!("  {:>5}  {:>5}  {:<40}  {}", "Stage", "Batch", "Source", "Tasks");
    println!("  {}  {}  {}  {}", "-----", "-----", "-".repeat(40), "-----");
    for b in &plan.batches {
        let tasks: Vec<&str> = b.tasks.iter().map(|t| t.as_str()).collect();
        println!(
            "  {:>5}  {:>5}  {:<40}  {}",
            b.stage,
            b.id,
            b.source.display(),
            tasks.join(", ")
        );
    }
    println!(
        "{} task(s) in {} batch(es), {} stage(s)",
        plan.task_count(),
        plan.batches.len(),
        plan.stage_count()
    );
}

pub fn run_plan(cfg: &SplitConfig, json: bool) -> Result<()> {
    let plan = scheduler::plan(cfg).context("planning failed")?;
    if json {
        println!("{}", plan.to_json()?);
    } else if plan.batches.is_empty() {
        println!("No clipbounds found in {}.", cfg.catalog_dir.display());
    } else {
        print_plan(&plan);
    }
    Ok(())
}
