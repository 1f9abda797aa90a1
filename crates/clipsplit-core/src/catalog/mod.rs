//! Catalog of boundary descriptors and the tasks/batches derived from it.
//!
//! A descriptor `clipbounds/europe/germany.poly` becomes task `europe/germany`,
//! whose parent region is `europe`. Sibling tasks are grouped into batches that
//! share one source dataset.

mod index;
mod layout;
mod walk;

use serde::Serialize;
use std::fmt;

pub use index::CatalogIndex;
pub use layout::Layout;
pub use walk::CatalogWalker;

/// Slash-separated, catalog-relative task identifier without extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of the directory containing this task (`None` at catalog root).
    pub fn parent(&self) -> Option<TaskId> {
        self.0
            .rsplit_once('/')
            .map(|(dir, _)| TaskId(dir.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    /// Directory segment containing the task; `None` for tasks at the catalog root.
    pub parent_key: Option<TaskId>,
}

impl Task {
    pub fn new(id: TaskId) -> Self {
        let parent_key = id.parent();
        Self { id, parent_key }
    }
}

/// Sibling tasks dispatched together to one engine invocation.
///
/// All tasks share `parent_key`; the walker never exceeds its size limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    id: usize,
    parent_key: Option<TaskId>,
    tasks: Vec<Task>,
}

impl Batch {
    pub(crate) fn new(id: usize, parent_key: Option<TaskId>) -> Self {
        Self {
            id,
            parent_key,
            tasks: Vec::new(),
        }
    }

    /// Build a batch from task identifiers. Returns `None` if the tasks do not
    /// share one parent directory or the list is empty.
    pub fn from_ids<I, S>(id: usize, ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks: Vec<Task> = ids
            .into_iter()
            .map(|s| Task::new(TaskId::new(s)))
            .collect();
        let parent_key = tasks.first()?.parent_key.clone();
        if tasks.iter().any(|t| t.parent_key != parent_key) {
            return None;
        }
        Some(Self {
            id,
            parent_key,
            tasks,
        })
    }

    /// Walk order index, stable across re-walks of an unchanged catalog.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent_key(&self) -> Option<&TaskId> {
        self.parent_key.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|t| &t.id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn push(&mut self, task: Task) {
        debug_assert_eq!(task.parent_key, self.parent_key);
        self.tasks.push(task);
    }

    /// Short label for logs and errors, e.g. `#3 [germany, italy]`.
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.task_ids().map(TaskId::as_str).collect();
        format!("#{} [{}]", self.id, names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_parent_key_is_containing_directory() {
        assert_eq!(Task::new(TaskId::new("europe")).parent_key, None);
        assert_eq!(
            Task::new(TaskId::new("europe/germany")).parent_key,
            Some(TaskId::new("europe"))
        );
        assert_eq!(
            Task::new(TaskId::new("europe/germany/berlin")).parent_key,
            Some(TaskId::new("europe/germany"))
        );
    }

    #[test]
    fn batch_from_ids_requires_common_parent() {
        let b = Batch::from_ids(0, ["europe/germany", "europe/italy"]).unwrap();
        assert_eq!(b.parent_key(), Some(&TaskId::new("europe")));
        assert_eq!(b.len(), 2);
        assert_eq!(b.describe(), "#0 [europe/germany, europe/italy]");
        assert!(Batch::from_ids(1, ["asia", "europe/italy"]).is_none());
        assert!(Batch::from_ids(2, Vec::<String>::new()).is_none());
    }
}
