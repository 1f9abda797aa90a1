//! Unbounded FIFO of batches shared by the producer and the worker pool.
//!
//! Tracks unfinished work like a join-able queue: every `push` counts one item,
//! every `task_done` releases one, and `join` resolves when the count hits zero.
//! A requeue is a `push` followed by the popper's `task_done`, so the count
//! never drops to zero while a batch is still waiting on its parent.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::catalog::Batch;

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Batch>,
    unfinished: usize,
    closed: bool,
    aborted: bool,
}

#[derive(Debug, Default)]
pub struct BatchQueue {
    state: Mutex<QueueState>,
    available: Notify,
    drained: Notify,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().expect("batch queue lock poisoned")
    }

    /// Append to the back. Never blocks.
    pub fn push(&self, batch: Batch) {
        {
            let mut state = self.lock();
            state.items.push_back(batch);
            state.unfinished += 1;
        }
        self.available.notify_one();
    }

    /// Wait for the next batch. Returns `None` once the queue is closed and
    /// empty, or immediately after an abort.
    pub async fn pop(&self) -> Option<Batch> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.lock();
                if state.aborted {
                    return None;
                }
                if let Some(batch) = state.items.pop_front() {
                    return Some(batch);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Mark one popped batch as handled (dispatched, requeued or failed).
    pub fn task_done(&self) {
        let drained = {
            let mut state = self.lock();
            state.unfinished = state.unfinished.saturating_sub(1);
            state.unfinished == 0
        };
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Resolve when every pushed batch has been handled, or on abort.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let state = self.lock();
                if state.unfinished == 0 || state.aborted {
                    return;
                }
            }
            notified.await;
        }
    }

    /// No more batches will be pushed; idle poppers return `None`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_waiters();
    }

    /// Stop handing out batches and release `join`.
    pub fn abort(&self) {
        self.lock().aborted = true;
        self.available.notify_waiters();
        self.drained.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    /// Batches waiting to be popped.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushed batches not yet marked done (queued or held by a worker).
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }
}
