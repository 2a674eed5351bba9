//! Fluent builder for Runtime construction.
//!
//! Provides a builder pattern interface for creating and configuring Runtime instances.

use crate::error::BuildError;
use crate::runtime::Runtime;

use std::time::Duration;

const DEFAULT_WORKER_THREADS: usize = 2;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const DEFAULT_THREAD_NAME: &str = "coro-worker";

/// Builder for constructing Runtime instances with fluent API.
///
/// # Example
/// ```ignore
/// let rt = RuntimeBuilder::new()
///     .worker_threads(4)
///     .poll_interval(Duration::from_millis(5))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    worker_threads: usize,
    poll_interval: Duration,
    thread_name: String,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a new runtime builder with two workers and a 20ms poll interval.
    pub fn new() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// Sets the number of worker threads. Must be positive.
    pub fn worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = n;
        self
    }

    /// Sets how long an idle worker sleeps before polling the queue again.
    ///
    /// Shorter intervals lower the latency of timed resumptions at the cost
    /// of more wake-ups while the queue holds only future actions.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the prefix of worker thread names. Worker `i` is named `{prefix}-{i}`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Builds the runtime and starts its workers.
    ///
    /// # Errors
    /// - [`BuildError::NoWorkers`] if the pool size is zero
    /// - [`BuildError::ZeroPollInterval`] if the poll interval is zero
    /// - [`BuildError::Spawn`] if a worker thread could not be started
    pub fn build(self) -> Result<Runtime, BuildError> {
        if self.worker_threads == 0 {
            return Err(BuildError::NoWorkers);
        }
        if self.poll_interval.is_zero() {
            return Err(BuildError::ZeroPollInterval);
        }

        Runtime::launch(self.worker_threads, self.poll_interval, &self.thread_name)
    }
}
