//! Dry-run plan: batches, the dataset each one reads, and its earliest stage.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::catalog::{Batch, CatalogIndex, Layout, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBatch {
    pub id: usize,
    pub tasks: Vec<TaskId>,
    /// Task that must finish first; `None` reads the master dataset.
    pub depends_on: Option<TaskId>,
    pub source: PathBuf,
    /// 0 for master-sourced batches, parent's stage + 1 otherwise.
    pub stage: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub batches: Vec<PlannedBatch>,
}

impl Plan {
    pub fn build(batches: &[Batch], index: &CatalogIndex, layout: &Layout) -> Self {
        let mut stage_of: HashMap<&TaskId, usize> = HashMap::new();
        let mut planned = Vec::with_capacity(batches.len());
        for batch in batches {
            let depends_on = index.dependency_of(batch).cloned();
            let stage = match &depends_on {
                Some(parent) => stage_of.get(parent).copied().unwrap_or(0) + 1,
                None => 0,
            };
            for id in batch.task_ids() {
                stage_of.insert(id, stage);
            }
            planned.push(PlannedBatch {
                id: batch.id(),
                tasks: batch.task_ids().cloned().collect(),
                source: layout.source_for(depends_on.as_ref()),
                depends_on,
                stage,
            });
        }
        Self { batches: planned }
    }

    pub fn task_count(&self) -> usize {
        self.batches.iter().map(|b| b.tasks.len()).sum()
    }

    /// Number of dependency levels (0 for an empty plan).
    pub fn stage_count(&self) -> usize {
        self.batches.iter().map(|b| b.stage + 1).max().unwrap_or(0)
    }

    /// Pretty-printed JSON, as printed by `plan --json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
