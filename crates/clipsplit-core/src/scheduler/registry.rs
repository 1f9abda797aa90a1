//! Append-only record of tasks whose output is ready to be read.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::catalog::TaskId;

#[derive(Debug, Default)]
pub struct CompletionRegistry {
    finished: RwLock<HashSet<TaskId>>,
}

impl CompletionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashSet<TaskId>> {
        self.finished.read().expect("completion registry lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<TaskId>> {
        self.finished.write().expect("completion registry lock poisoned")
    }

    /// Record tasks as finished. Idempotent.
    pub fn mark_finished<'a>(&self, ids: impl IntoIterator<Item = &'a TaskId>) {
        let mut finished = self.write();
        for id in ids {
            finished.insert(id.clone());
        }
    }

    pub fn is_finished(&self, id: &TaskId) -> bool {
        self.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the finished set.
    pub fn snapshot(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.read().iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn mark_is_idempotent() {
        let r = CompletionRegistry::new();
        let europe = TaskId::new("europe");
        assert!(!r.is_finished(&europe));
        r.mark_finished([&europe]);
        r.mark_finished([&europe]);
        assert!(r.is_finished(&europe));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn concurrent_marks_from_many_threads() {
        let r = Arc::new(CompletionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    let ids: Vec<TaskId> =
                        (0..50).map(|i| TaskId::new(format!("t{t}/{i}"))).collect();
                    r.mark_finished(&ids);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.len(), 400);
        let snap = r.snapshot();
        assert!(snap.windows(2).all(|w| w[0] < w[1]));
    }
}
