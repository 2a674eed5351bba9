//! Shared helpers for integration tests.

#![allow(dead_code)]

use coro::{Runtime, RuntimeBuilder};

use std::sync::Once;
use std::time::Duration;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Honours `RUST_LOG`; defaults to `warn` so contract-violation logs show up.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Builds a runtime with `workers` threads and a short poll interval.
pub fn runtime(workers: usize) -> Runtime {
    init_test_logging();

    RuntimeBuilder::new()
        .worker_threads(workers)
        .poll_interval(Duration::from_millis(2))
        .build()
        .expect("runtime should build")
}
