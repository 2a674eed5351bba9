//! Worker threads that drain the ready queue.
//!
//! Each worker repeatedly pops the earliest action. Actions that are not due
//! yet go straight back into the queue and the worker naps for a short poll
//! interval, bounded by the time left until the head becomes ready. Panics in
//! effects are caught and logged so one bad action never takes a worker down.

use crate::runtime::queue::ReadyQueue;

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawns a named worker thread servicing `queue`.
///
/// # Arguments
/// * `id` - Index of the worker, used in its thread name and log fields
/// * `name` - Thread name
/// * `queue` - The shared ready queue
/// * `poll_interval` - Upper bound on how long an idle worker sleeps
pub(crate) fn spawn_worker(
    id: usize,
    name: String,
    queue: Arc<ReadyQueue>,
    poll_interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name)
        .spawn(move || run(id, &queue, poll_interval))
}

fn run(id: usize, queue: &ReadyQueue, poll_interval: Duration) {
    tracing::debug!(worker = id, "worker started");

    while !queue.is_shutdown() {
        let Some(action) = queue.pop() else {
            thread::sleep(poll_interval);
            continue;
        };

        let delay = action.delay();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| action.try_run()));

        match outcome {
            Ok(Ok(elapsed)) => {
                tracing::trace!(
                    worker = id,
                    delay_ms = delay.as_millis() as u64,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "action ran"
                );
            }
            Ok(Err(early)) => {
                queue.push(early);
                nap(queue, poll_interval);
            }
            Err(payload) => {
                tracing::error!(
                    worker = id,
                    delay_ms = delay.as_millis() as u64,
                    panic = %panic_message(payload.as_ref()),
                    "action panicked"
                );
            }
        }
    }

    tracing::debug!(worker = id, "worker stopped");
}

// Sleep no longer than the poll interval, and no longer than it takes the head to become ready.
fn nap(queue: &ReadyQueue, poll_interval: Duration) {
    let wait = queue
        .next_ready_in()
        .map_or(poll_interval, |remaining| remaining.min(poll_interval));

    if wait.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(wait);
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
