//! Error types for the runtime, bridges and generators.

use std::error::Error as StdError;
use std::io;

/// Boxed error raised by a computation step.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors returned by [`RuntimeBuilder::build`](crate::RuntimeBuilder::build).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The worker pool must contain at least one thread.
    #[error("worker pool size must be positive")]
    NoWorkers,

    /// A zero poll interval would turn idle workers into pure spinners.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// The recorded failure of a computation, delivered through its bridge.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// A step returned an error.
    #[error("computation failed: {0}")]
    Raised(#[source] BoxError),

    /// A step panicked while running on a worker.
    #[error("computation panicked: {0}")]
    Panicked(String),

    /// The computation was dropped before completing, e.g. because the
    /// runtime shut down while its next step was still queued.
    #[error("computation was abandoned before completing")]
    Abandoned,
}

/// Contract violations on a bridge's writing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The bridge already holds an outcome; the new one was discarded.
    #[error("bridge already completed")]
    AlreadyCompleted,
}

/// Errors returned by [`Generator::consume`](crate::Generator::consume).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// The producer finished and no value is left.
    #[error("generator exhausted")]
    Exhausted,
}
