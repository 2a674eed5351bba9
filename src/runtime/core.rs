//! Runtime owning the ready queue and its pool of worker threads.
//!
//! The runtime is an explicit value rather than a process-wide singleton: it is
//! created with a fixed pool size, hands out [`Handle`]s, and stops its workers
//! on [`Runtime::shutdown`] or when dropped.

use crate::bridge::Bridge;
use crate::builder::RuntimeBuilder;
use crate::coroutine::{Co, Step};
use crate::error::BuildError;
use crate::runtime::queue::ReadyQueue;
use crate::runtime::worker::spawn_worker;
use crate::runtime::Handle;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cooperative coroutine runtime.
///
/// Computations started on the runtime run their steps on a fixed pool of
/// worker threads. Between two steps a computation exists only as a queued
/// closure, so far more computations can be pending than there are workers.
pub struct Runtime {
    handle: Handle,
    queue: Arc<ReadyQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    ///
    /// # Panics
    /// Panics if a worker thread cannot be spawned. Use
    /// [`RuntimeBuilder::build`] to handle that case.
    ///
    /// # Example
    /// ```ignore
    /// let rt = Runtime::new();
    /// ```
    pub fn new() -> Self {
        match RuntimeBuilder::new().build() {
            Ok(runtime) => runtime,
            Err(err) => panic!("failed to start runtime: {err}"),
        }
    }

    /// Returns a builder to configure a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub(crate) fn launch(
        worker_threads: usize,
        poll_interval: Duration,
        thread_name: &str,
    ) -> Result<Self, BuildError> {
        let queue = Arc::new(ReadyQueue::new());
        let mut runtime = Self {
            handle: Handle::new(queue.clone()),
            queue: queue.clone(),
            workers: Vec::with_capacity(worker_threads),
        };

        for id in 0..worker_threads {
            let name = format!("{thread_name}-{id}");
            // On error, dropping `runtime` stops the workers already running.
            let worker = spawn_worker(id, name, queue.clone(), poll_interval)?;
            runtime.workers.push(worker);
        }

        tracing::debug!(
            workers = worker_threads,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "runtime started"
        );

        Ok(runtime)
    }

    /// Returns a handle that can schedule work on this runtime from anywhere.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Schedules a raw effect; see [`Handle::schedule`].
    pub fn schedule<F>(&self, delay: Duration, effect: F) -> bool
    where
        F: FnOnce(Duration) + Send + 'static,
    {
        self.handle.schedule(delay, effect)
    }

    /// Starts a computation; see [`Handle::start`].
    pub fn start<T, F>(&self, computation: F) -> Bridge<T>
    where
        T: Send + 'static,
        F: FnOnce(Co<T>) -> Step<T> + Send + 'static,
    {
        self.handle.start(computation)
    }

    /// Number of actions currently waiting in the ready queue.
    pub fn pending(&self) -> usize {
        self.handle.pending()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops the workers and drops every action still queued.
    ///
    /// Actions already running finish their current step. Computations whose
    /// next step was dropped resolve to [`Failure::Abandoned`](crate::Failure::Abandoned).
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.workers.is_empty() && self.queue.is_shutdown() {
            return;
        }

        let dropped = self.queue.shutdown();
        let current = thread::current().id();

        for worker in self.workers.drain(..) {
            // A runtime dropped from inside one of its own effects cannot join itself.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                tracing::warn!("worker thread exited with a panic");
            }
        }

        tracing::debug!(dropped, "runtime shut down");
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("workers", &self.workers.len())
            .field("pending", &self.pending())
            .finish()
    }
}
