//! Explicit task → parent map built once from the walked batches.

use std::collections::{HashMap, HashSet};

use super::{Batch, TaskId};

/// Maps every task to the parent it actually reads from.
///
/// A task whose containing directory has no descriptor of its own has no
/// effective parent and reads the master dataset.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    parents: HashMap<TaskId, Option<TaskId>>,
}

impl CatalogIndex {
    pub fn build<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Self {
        let mut parents: HashMap<TaskId, Option<TaskId>> = HashMap::new();
        for batch in batches {
            for task in batch.tasks() {
                parents.insert(task.id.clone(), task.parent_key.clone());
            }
        }
        let known: HashSet<TaskId> = parents.keys().cloned().collect();
        for parent in parents.values_mut() {
            if parent.as_ref().is_some_and(|p| !known.contains(p)) {
                *parent = None;
            }
        }
        Self { parents }
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.parents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Effective parent of a task (`None` = reads the master dataset).
    pub fn parent_of(&self, id: &TaskId) -> Option<&TaskId> {
        self.parents.get(id).and_then(Option::as_ref)
    }

    /// Task whose output a batch reads, or `None` for the master dataset.
    pub fn dependency_of(&self, batch: &Batch) -> Option<&TaskId> {
        batch.task_ids().next().and_then(|id| self.parent_of(id))
    }
}
