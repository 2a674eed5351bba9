//! One-shot bridge delivering a computation's outcome to its caller.
//!
//! A bridge has two halves. The [`Completer`] is written exactly once, by
//! whichever worker runs the computation's final step. The [`Bridge`] is held
//! by the caller, who can poll it, block on it, or `.await` it.
//!
//! # Example
//!
//! ```ignore
//! use coro::bridge;
//!
//! let (completer, bridge) = bridge::channel();
//! std::thread::spawn(move || {
//!     completer.complete(42).unwrap();
//! });
//! assert_eq!(bridge.wait().unwrap(), 42);
//! ```
//!
//! # Racing two bridges
//!
//! The runtime has no built-in timeouts. A caller that wants one starts a
//! second computation that only sleeps and races both bridges:
//!
//! ```ignore
//! use futures::future::{Either, select};
//!
//! let work = rt.start(slow_computation);
//! let timer = rt.start(|co| co.sleep(100, |_, _| Step::done(())));
//! match futures::executor::block_on(select(work, timer)) {
//!     Either::Left((outcome, _)) => println!("finished: {:?}", outcome),
//!     Either::Right(_) => println!("timed out"),
//! }
//! ```

use crate::error::{BoxError, BridgeError, Failure};

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// The final outcome of a computation.
pub type Outcome<T> = Result<T, Failure>;

enum State<T> {
    Pending(Vec<Waker>),
    Ready(Outcome<T>),
    Taken,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

/// Creates a connected completer/bridge pair.
pub fn channel<T>() -> (Completer<T>, Bridge<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending(Vec::new())),
        ready: Condvar::new(),
    });

    (
        Completer {
            shared: shared.clone(),
        },
        Bridge { shared },
    )
}

/// Writing half of a bridge.
///
/// Dropping a completer that was never used records [`Failure::Abandoned`],
/// so a caller blocked in [`Bridge::wait`] is released even if the
/// computation never gets to run.
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Completer<T> {
    /// Completes the bridge with a value.
    ///
    /// # Errors
    /// [`BridgeError::AlreadyCompleted`] if an outcome was already recorded.
    /// The recorded outcome is left untouched.
    pub fn complete(&self, value: T) -> Result<(), BridgeError> {
        self.settle(Ok(value))
    }

    /// Completes the bridge with a failure.
    ///
    /// # Errors
    /// [`BridgeError::AlreadyCompleted`] if an outcome was already recorded.
    pub fn fail(&self, error: impl Into<BoxError>) -> Result<(), BridgeError> {
        self.settle(Err(Failure::Raised(error.into())))
    }

    /// Returns `true` once an outcome has been recorded.
    pub fn is_complete(&self) -> bool {
        !matches!(*self.shared.state.lock(), State::Pending(_))
    }

    pub(crate) fn settle(&self, outcome: Outcome<T>) -> Result<(), BridgeError> {
        let wakers = {
            let mut state = self.shared.state.lock();
            let State::Pending(wakers) = &mut *state else {
                return Err(BridgeError::AlreadyCompleted);
            };

            let wakers = std::mem::take(wakers);
            *state = State::Ready(outcome);
            wakers
        };

        self.shared.ready.notify_all();
        for waker in wakers {
            waker.wake();
        }

        Ok(())
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if self.settle(Err(Failure::Abandoned)).is_ok() {
            tracing::warn!("computation dropped before completing");
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Reading half of a bridge, returned to whoever started the computation.
///
/// The outcome can be taken once, either by [`wait`](Self::wait),
/// [`try_wait`](Self::try_wait), [`wait_timeout`](Self::wait_timeout) or by
/// awaiting the bridge as a future.
pub struct Bridge<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Bridge<T> {
    /// Returns `true` once the computation has completed, even if the
    /// outcome has already been taken.
    pub fn is_complete(&self) -> bool {
        !matches!(*self.shared.state.lock(), State::Pending(_))
    }

    /// Takes the outcome without blocking.
    ///
    /// # Returns
    /// `None` while the computation is still running, and also after the
    /// outcome has already been taken.
    pub fn try_wait(&mut self) -> Option<Outcome<T>> {
        take_ready(&mut self.shared.state.lock())
    }

    /// Blocks the current thread until the computation completes.
    ///
    /// # Panics
    /// Panics if the outcome was already taken through `try_wait` or `wait_timeout`.
    pub fn wait(self) -> Outcome<T> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(outcome) = take_ready(&mut state) {
                return outcome;
            }
            if matches!(*state, State::Taken) {
                panic!("bridge outcome already taken");
            }

            self.shared.ready.wait(&mut state);
        }
    }

    /// Blocks until the computation completes or `timeout` elapses.
    ///
    /// # Returns
    /// `Some(outcome)` if it completed in time, `None` otherwise. On `None`
    /// the bridge stays usable and can be waited on again.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Outcome<T>> {
        let mut state = self.shared.state.lock();

        // A timeout past the end of `Instant` is the same as no timeout.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while matches!(*state, State::Pending(_)) {
                self.shared.ready.wait(&mut state);
            }
            return take_ready(&mut state);
        };

        while matches!(*state, State::Pending(_)) {
            if self.shared.ready.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }

        take_ready(&mut state)
    }
}

fn take_ready<T>(state: &mut State<T>) -> Option<Outcome<T>> {
    if !matches!(state, State::Ready(_)) {
        return None;
    }

    match std::mem::replace(state, State::Taken) {
        State::Ready(outcome) => Some(outcome),
        _ => None,
    }
}

impl<T> Future for Bridge<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();

        if let State::Pending(wakers) = &mut *state {
            if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                wakers.push(cx.waker().clone());
            }
            return Poll::Pending;
        }

        match take_ready(&mut state) {
            Some(outcome) => Poll::Ready(outcome),
            None => panic!("bridge polled after its outcome was taken"),
        }
    }
}

impl<T> fmt::Debug for Bridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("complete", &self.is_complete())
            .finish()
    }
}
