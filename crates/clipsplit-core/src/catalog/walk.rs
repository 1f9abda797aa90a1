//! Breadth-first catalog traversal producing sibling batches.
//!
//! Directories are visited one at a time from a FIFO of pending directories,
//! entries in lexicographic order. Sub-directories are queued, never expanded
//! in place, so an ancestor's batch is always emitted before any descendant's.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SchedulerError;

use super::{Batch, Task, TaskId};

/// Walks a catalog directory and groups matching descriptors into batches.
#[derive(Debug, Clone)]
pub struct CatalogWalker {
    root: PathBuf,
    extension: String,
    max_batch_size: usize,
}

/// Accumulates tasks of one directory until it changes or the batch fills up.
struct Pending {
    batch: Option<Batch>,
    dir: Option<PathBuf>,
    next_id: usize,
}

impl Pending {
    fn flush(&mut self, emit: &mut impl FnMut(Batch)) {
        if let Some(batch) = self.batch.take() {
            if !batch.is_empty() {
                emit(batch);
            }
        }
    }
}

impl CatalogWalker {
    /// `extension` is the descriptor suffix including its dot (e.g. `.poly`).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, max_batch_size: usize) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Traverse the catalog, calling `emit` for every batch in walk order.
    pub fn walk(&self, mut emit: impl FnMut(Batch)) -> Result<(), SchedulerError> {
        let mut dirs: VecDeque<PathBuf> = VecDeque::from([self.root.clone()]);
        let mut pending = Pending {
            batch: None,
            dir: None,
            next_id: 0,
        };

        while let Some(dir) = dirs.pop_front() {
            let mut entries = fs::read_dir(&dir)
                .and_then(|rd| rd.collect::<Result<Vec<_>, _>>())
                .map_err(|source| SchedulerError::Walk {
                    path: dir.clone(),
                    source,
                })?;
            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let path = entry.path();
                let file_type = entry.file_type().map_err(|source| SchedulerError::Walk {
                    path: path.clone(),
                    source,
                })?;

                if file_type.is_dir() {
                    dirs.push_back(path);
                    continue;
                }
                if file_type.is_symlink() && path.is_dir() {
                    tracing::debug!("skipping symlinked directory {}", path.display());
                    continue;
                }

                let Some(id) = self.task_id_for(&path) else {
                    continue;
                };

                let dir_changed = pending.dir.as_deref() != Some(dir.as_path());
                let full = pending
                    .batch
                    .as_ref()
                    .is_some_and(|b| b.len() >= self.max_batch_size);
                if dir_changed || full {
                    pending.flush(&mut emit);
                }

                let task = Task::new(id);
                let batch = pending.batch.get_or_insert_with(|| {
                    let b = Batch::new(pending.next_id, task.parent_key.clone());
                    pending.next_id += 1;
                    b
                });
                batch.push(task);
                pending.dir = Some(dir.clone());
            }
        }

        pending.flush(&mut emit);
        Ok(())
    }

    /// Walk the whole catalog into a vector of batches.
    pub fn collect(&self) -> Result<Vec<Batch>, SchedulerError> {
        let mut batches = Vec::new();
        self.walk(|b| batches.push(b))?;
        Ok(batches)
    }

    /// Task identifier for a descriptor path, or `None` if the entry is not a descriptor.
    fn task_id_for(&self, path: &Path) -> Option<TaskId> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in rel.components() {
            match component.as_os_str().to_str() {
                Some(s) => parts.push(s),
                None => {
                    tracing::warn!("skipping non UTF-8 catalog entry {}", path.display());
                    return None;
                }
            }
        }
        let name = parts.pop()?;
        let stem = name.strip_suffix(self.extension.as_str())?;
        if stem.is_empty() {
            return None;
        }
        parts.push(stem);
        Some(TaskId::new(parts.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "").unwrap();
    }

    fn ids(batches: &[Batch]) -> Vec<Vec<String>> {
        batches
            .iter()
            .map(|b| b.task_ids().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn clipbounds_scenario_groups_siblings() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["europe.poly", "asia.poly", "europe/germany.poly", "europe/italy.poly"] {
            touch(dir.path(), f);
        }
        let batches = CatalogWalker::new(dir.path(), ".poly", 5).collect().unwrap();
        assert_eq!(
            ids(&batches),
            vec![
                vec!["asia".to_string(), "europe".to_string()],
                vec!["europe/germany".to_string(), "europe/italy".to_string()],
            ]
        );
        assert_eq!(batches[0].parent_key(), None);
        assert_eq!(batches[1].parent_key(), Some(&TaskId::new("europe")));
        assert_eq!(batches[0].id(), 0);
        assert_eq!(batches[1].id(), 1);
    }

    #[test]
    fn size_limit_splits_directory() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["a.poly", "b.poly", "c.poly"] {
            touch(dir.path(), f);
        }
        let batches = CatalogWalker::new(dir.path(), ".poly", 2).collect().unwrap();
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn batches_never_mix_directories_or_exceed_limit() {
        let dir = tempfile::tempdir().unwrap();
        for f in [
            "a.poly", "b.poly", "a/x.poly", "a/y.poly", "a/z.poly", "b/q.poly",
            "a/x/deep1.poly", "a/x/deep2.poly", "c/orphan.poly",
        ] {
            touch(dir.path(), f);
        }
        let batches = CatalogWalker::new(dir.path(), ".poly", 2).collect().unwrap();
        let total: usize = batches.iter().map(Batch::len).sum();
        assert_eq!(total, 9);
        for b in &batches {
            assert!(b.len() <= 2 && !b.is_empty());
            for t in b.tasks() {
                assert_eq!(t.parent_key.as_ref(), b.parent_key());
            }
        }
    }

    #[test]
    fn ancestors_are_emitted_before_descendants() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["a.poly", "a/b.poly", "a/b/c.poly", "z.poly", "z/y.poly"] {
            touch(dir.path(), f);
        }
        let batches = CatalogWalker::new(dir.path(), ".poly", 5).collect().unwrap();
        let order: Vec<String> = batches
            .iter()
            .flat_map(|b| b.task_ids().map(|t| t.to_string()).collect::<Vec<_>>())
            .collect();
        let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
        assert!(pos("a") < pos("a/b"));
        assert!(pos("a/b") < pos("a/b/c"));
        assert!(pos("z") < pos("z/y"));
        // Breadth-first: z/y is at depth 1, so it comes before the depth-2 a/b/c.
        assert!(pos("z/y") < pos("a/b/c"));
    }

    #[test]
    fn other_extensions_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["a.poly", "notes.txt", "b.osm", ".poly"] {
            touch(dir.path(), f);
        }
        let batches = CatalogWalker::new(dir.path(), ".poly", 5).collect().unwrap();
        assert_eq!(ids(&batches), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn rewalk_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["m.poly", "k.poly", "m/n.poly", "m/o.poly", "m/p.poly", "k/l.poly"] {
            touch(dir.path(), f);
        }
        let walker = CatalogWalker::new(dir.path(), ".poly", 2);
        assert_eq!(walker.collect().unwrap(), walker.collect().unwrap());
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CatalogWalker::new(dir.path(), ".poly", 5)
            .collect()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogWalker::new(dir.path().join("missing"), ".poly", 5)
            .collect()
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Walk { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_traversed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.poly");
        touch(dir.path(), "a/b.poly");
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("a/loop")).unwrap();
        let batches = CatalogWalker::new(dir.path(), ".poly", 5).collect().unwrap();
        assert_eq!(
            ids(&batches),
            vec![vec!["a".to_string()], vec!["a/b".to_string()]]
        );
    }
}
