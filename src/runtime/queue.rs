//! Thread-safe ready queue ordering timed actions by their ready time.
//!
//! A min-heap behind a mutex. Workers pop the earliest action, run it if it is
//! due, and put it back unchanged if it is not. Every push and pop goes through
//! the same lock, so the queue is the only point of synchronisation between
//! workers.

use crate::runtime::action::{Effect, TimedAction};

use parking_lot::Mutex;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A concurrent min-heap of [`TimedAction`]s keyed by ready time.
pub(crate) struct ReadyQueue {
    heap: Mutex<BinaryHeap<TimedAction>>,
    seq: AtomicU64,
    shutdown: AtomicBool,
}

impl ReadyQueue {
    /// Creates a new empty ready queue.
    pub(crate) fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Schedules an effect to run `delay` from now.
    ///
    /// # Arguments
    /// * `delay` - Time to wait before the effect may run; zero means "as soon as a worker is free"
    /// * `effect` - The work to perform, given the actually elapsed time
    ///
    /// # Returns
    /// `true` if the action was queued, `false` if the queue is shut down and
    /// the action was dropped.
    pub(crate) fn schedule(&self, delay: Duration, effect: Effect) -> bool {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.push(TimedAction::new(delay, seq, effect))
    }

    /// Inserts an action, keeping its ready time and sequence number.
    ///
    /// Used both for fresh actions and to put back actions popped too early.
    pub(crate) fn push(&self, action: TimedAction) -> bool {
        let mut heap = self.heap.lock();

        // Checked under the lock so nothing slips in after `shutdown` drained the heap.
        if self.is_shutdown() {
            drop(heap);
            tracing::trace!(?action, "queue shut down, dropping action");
            return false;
        }

        heap.push(action);
        true
    }

    /// Removes and returns the action with the earliest ready time.
    pub(crate) fn pop(&self) -> Option<TimedAction> {
        self.heap.lock().pop()
    }

    /// Returns how long until the head of the queue becomes ready.
    ///
    /// `None` when the queue is empty, `Duration::ZERO` when the head is already due.
    pub(crate) fn next_ready_in(&self) -> Option<Duration> {
        let heap = self.heap.lock();
        heap.peek()
            .map(|action| action.ready_at().saturating_duration_since(Instant::now()))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Stops accepting work and drops every queued action.
    ///
    /// # Returns
    /// The number of actions that were dropped.
    pub(crate) fn shutdown(&self) -> usize {
        let pending = {
            let mut heap = self.heap.lock();
            self.shutdown.store(true, Ordering::SeqCst);
            std::mem::take(&mut *heap)
        };

        // Effects may own completers whose drop wakes waiters; do that outside the lock.
        let dropped = pending.len();
        drop(pending);
        dropped
    }

    /// Checks if shutdown has been requested.
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
