//! Computations split into steps at explicit suspension points.
//!
//! A computation is written in continuation-passing style: every step receives
//! a [`Co`] context and returns a [`Step`]. The only way to pause is
//! [`Co::sleep`], which takes the rest of the computation as a closure.
//!
//! - With a positive delay the closure is packaged into a timed action and the
//!   step returns the suspended marker. The current call stack unwinds back to
//!   the worker loop and the closure later resumes on whichever worker pops it.
//! - With a zero or negative delay nothing is queued: the closure runs right
//!   away on the current thread and receives [`Resumed::Immediate`]. It is
//!   driven by the same loop that runs the step, not called from inside it, so
//!   any number of fast-path points in a row uses constant stack.
//!
//! `sleep` consumes the context, so a step suspends at most once and each
//! continuation is resumed at most once.
//!
//! When a step returns [`Step::done`] or [`Step::fail`] the computation's
//! bridge is completed. Panics inside a step are caught and recorded as
//! [`Failure::Panicked`].
//!
//! # Example
//!
//! ```ignore
//! use coro::{Runtime, Step};
//!
//! let rt = Runtime::new();
//! let bridge = rt.start(|co| {
//!     co.sleep(100, |_co, resumed| Step::done(resumed.as_millis()))
//! });
//! assert!(bridge.wait().unwrap() >= 100);
//! ```

use crate::bridge::{Completer, Outcome};
use crate::error::{BoxError, Failure};
use crate::runtime::queue::ReadyQueue;
use crate::runtime::worker::panic_message;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What a suspension point hands back to the rest of the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// The requested delay was zero or negative; the computation never left
    /// the current thread.
    Immediate,

    /// The computation was suspended and resumed after the given time.
    /// This is at least the requested delay, plus scheduling jitter.
    After(Duration),
}

impl Resumed {
    /// Value reported by [`as_millis`](Self::as_millis) for the fast path.
    pub const SENTINEL: i64 = -1;

    /// Returns the elapsed milliseconds, or [`Resumed::SENTINEL`] if the
    /// computation did not suspend.
    pub fn as_millis(&self) -> i64 {
        match self {
            Resumed::Immediate => Self::SENTINEL,
            Resumed::After(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Returns the elapsed time if the computation was suspended.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Resumed::Immediate => None,
            Resumed::After(elapsed) => Some(*elapsed),
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, Resumed::Immediate)
    }
}

type Continuation<T> = Box<dyn FnOnce(Co<T>, Resumed) -> Step<T> + Send>;

enum StepKind<T> {
    Done(T),
    Failed(BoxError),
    Suspended,
    Continue(Co<T>, Continuation<T>),
}

/// The result of running one step of a computation.
///
/// Build one with [`Step::done`], [`Step::fail`] or [`Step::from_result`].
/// The suspended marker can only come from [`Co::sleep`].
#[must_use = "a step must be returned to the runtime"]
pub struct Step<T>(StepKind<T>);

impl<T> Step<T> {
    /// Ends the computation with a value.
    pub fn done(value: T) -> Self {
        Step(StepKind::Done(value))
    }

    /// Ends the computation with an error.
    pub fn fail(error: impl Into<BoxError>) -> Self {
        Step(StepKind::Failed(error.into()))
    }

    pub fn from_result<E: Into<BoxError>>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::done(value),
            Err(error) => Self::fail(error),
        }
    }

    /// Returns `true` if the step parked the rest of the computation in the
    /// ready queue instead of finishing.
    pub fn is_suspended(&self) -> bool {
        matches!(self.0, StepKind::Suspended)
    }

    fn suspended() -> Self {
        Step(StepKind::Suspended)
    }
}

impl<T: fmt::Debug> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            StepKind::Done(value) => f.debug_tuple("Done").field(value).finish(),
            StepKind::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
            StepKind::Suspended => f.write_str("Suspended"),
            StepKind::Continue(..) => f.write_str("Continue"),
        }
    }
}

struct Inner<T> {
    queue: Arc<ReadyQueue>,
    completer: Completer<T>,
}

/// Context handed to every step of a computation.
///
/// A step owns exactly one `Co`, and [`Co::sleep`] consumes it, so a step can
/// suspend at most once and every continuation is resumed at most once. If the
/// context is dropped before the computation completed, its bridge records
/// [`Failure::Abandoned`].
pub struct Co<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> Co<T> {
    pub(crate) fn new(queue: Arc<ReadyQueue>, completer: Completer<T>) -> Self {
        Self {
            inner: Arc::new(Inner { queue, completer }),
        }
    }

    /// Suspension point: runs `next` after `delay_ms` milliseconds.
    ///
    /// # Arguments
    /// * `delay_ms` - Requested delay; zero or negative takes the fast path
    /// * `next` - The rest of the computation
    ///
    /// # Returns
    /// A step the caller must return. For a positive delay it is the suspended
    /// marker; otherwise it hands `next` back to the step loop, which runs it
    /// on this thread as soon as the current step returns.
    pub fn sleep<K>(self, delay_ms: i64, next: K) -> Step<T>
    where
        K: FnOnce(Co<T>, Resumed) -> Step<T> + Send + 'static,
    {
        if delay_ms <= 0 {
            return Step(StepKind::Continue(self, Box::new(next)));
        }

        let queue = self.inner.queue.clone();
        let delay = Duration::from_millis(delay_ms.unsigned_abs());
        queue.schedule(
            delay,
            Box::new(move |elapsed| self.resume(next, Resumed::After(elapsed))),
        );

        Step::suspended()
    }

    /// Returns the name of the thread running the current step.
    pub fn worker_name(&self) -> String {
        thread::current()
            .name()
            .unwrap_or("<unnamed>")
            .to_string()
    }

    /// Runs one step, then every fast-path continuation it hands back, and
    /// records the outcome if the computation finished.
    pub(crate) fn resume<K>(self, step: K, resumed: Resumed)
    where
        K: FnOnce(Co<T>, Resumed) -> Step<T>,
    {
        let co = Co {
            inner: self.inner.clone(),
        };
        let mut result = panic::catch_unwind(AssertUnwindSafe(move || step(co, resumed)));

        let outcome: Outcome<T> = loop {
            match result {
                Ok(Step(StepKind::Continue(co, next))) => {
                    result = panic::catch_unwind(AssertUnwindSafe(move || {
                        next(co, Resumed::Immediate)
                    }));
                }
                Ok(Step(StepKind::Done(value))) => break Ok(value),
                Ok(Step(StepKind::Failed(error))) => break Err(Failure::Raised(error)),
                Ok(Step(StepKind::Suspended)) => return,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(panic = %message, "computation step panicked");
                    break Err(Failure::Panicked(message));
                }
            }
        };

        if let Err(error) = self.inner.completer.settle(outcome) {
            tracing::error!(%error, "computation completed more than once, outcome discarded");
        }
    }
}

impl<T> fmt::Debug for Co<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Co")
            .field("complete", &self.inner.completer.is_complete())
            .finish_non_exhaustive()
    }
}
