//! Clonable handle to a runtime's ready queue.

use crate::bridge::{self, Bridge};
use crate::coroutine::{Co, Resumed, Step};
use crate::runtime::queue::ReadyQueue;

use std::sync::Arc;
use std::time::Duration;

/// A cheap, thread-safe reference to a running [`Runtime`](crate::Runtime).
///
/// Handles let other threads (or running computations) schedule work without
/// holding the runtime itself. Work submitted after the runtime shut down is
/// dropped on the spot.
#[derive(Clone)]
pub struct Handle {
    queue: Arc<ReadyQueue>,
}

impl Handle {
    pub(crate) fn new(queue: Arc<ReadyQueue>) -> Self {
        Self { queue }
    }

    /// Schedules a raw effect to run once `delay` has elapsed.
    ///
    /// The effect receives the time that actually elapsed since scheduling.
    /// A panic inside the effect is logged by the worker and otherwise ignored.
    ///
    /// # Returns
    /// `false` if the runtime is shut down and the effect was dropped.
    pub fn schedule<F>(&self, delay: Duration, effect: F) -> bool
    where
        F: FnOnce(Duration) + Send + 'static,
    {
        self.queue.schedule(delay, Box::new(effect))
    }

    /// Starts a computation and returns the bridge its outcome will be written to.
    ///
    /// The first step is queued as a zero-delay action, so this returns before
    /// the computation has necessarily started.
    ///
    /// # Example
    /// ```ignore
    /// let bridge = handle.start(|co| co.sleep(10, |_, _| Step::done("ok")));
    /// assert_eq!(bridge.wait().unwrap(), "ok");
    /// ```
    pub fn start<T, F>(&self, computation: F) -> Bridge<T>
    where
        T: Send + 'static,
        F: FnOnce(Co<T>) -> Step<T> + Send + 'static,
    {
        let (completer, bridge) = bridge::channel();
        let co = Co::new(self.queue.clone(), completer);

        self.queue.schedule(
            Duration::ZERO,
            Box::new(move |_| co.resume(|co, _: Resumed| computation(co), Resumed::Immediate)),
        );

        bridge
    }

    /// Number of actions currently waiting in the ready queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_shutdown(&self) -> bool {
        self.queue.is_shutdown()
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("pending", &self.pending())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
