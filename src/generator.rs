//! Pull-driven generators built on the same step-splitting as computations.
//!
//! A generator body is a chain of steps. [`Producer::produce`] stores one value
//! and parks the rest of the body; [`Generator::consume`] hands the value out
//! and, when none is waiting, resumes the parked step inline on the caller's
//! thread until it produces again or finishes. There is no worker and no
//! locking: producer and consumer simply take turns on one thread.
//!
//! # Example
//!
//! ```ignore
//! use coro::{Flow, Generator, Producer};
//!
//! fn count_from(p: Producer<u32>, n: u32) -> Flow {
//!     p.produce(n, move |p| count_from(p, n + 1))
//! }
//!
//! let mut numbers = Generator::new(|p| count_from(p, 0));
//! assert_eq!(numbers.consume(), Ok(0));
//! assert_eq!(numbers.consume(), Ok(1));
//! ```

use crate::error::GeneratorError;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type ParkedStep<Y> = Box<dyn FnOnce(Producer<Y>) -> Flow>;

struct State<Y> {
    value: Option<Y>,
    parked: Option<ParkedStep<Y>>,
}

enum FlowKind {
    Parked,
    Finished,
}

/// How a producer step ended.
///
/// Either the step produced a value and parked the rest of the body (only
/// [`Producer::produce`] can build that), or the body is finished.
#[must_use = "a producer step must return its flow"]
pub struct Flow(FlowKind);

impl Flow {
    /// Ends the generator. Every later `consume` reports [`GeneratorError::Exhausted`].
    pub fn finish() -> Self {
        Flow(FlowKind::Finished)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.0, FlowKind::Finished)
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            FlowKind::Parked => f.write_str("Parked"),
            FlowKind::Finished => f.write_str("Finished"),
        }
    }
}

/// The producing side, handed to each step of a generator body.
///
/// `produce` consumes the producer, so a step cannot produce a second value
/// before the first one has been consumed.
pub struct Producer<Y> {
    state: Rc<RefCell<State<Y>>>,
}

impl<Y> Producer<Y> {
    /// Publishes `value` and parks `next` until the consumer asks for more.
    ///
    /// # Arguments
    /// * `value` - The value handed to the next `consume`
    /// * `next` - The rest of the generator body
    pub fn produce<K>(self, value: Y, next: K) -> Flow
    where
        K: FnOnce(Producer<Y>) -> Flow + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.value = Some(value);
        state.parked = Some(Box::new(next));

        Flow(FlowKind::Parked)
    }
}

/// A lazily started, pull-driven sequence of values.
///
/// The body does not run until the first [`consume`](Self::consume).
pub struct Generator<Y> {
    state: Rc<RefCell<State<Y>>>,
}

impl<Y: 'static> Generator<Y> {
    /// Creates a generator from its body. Nothing runs yet.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(Producer<Y>) -> Flow + 'static,
    {
        Self {
            state: Rc::new(RefCell::new(State {
                value: None,
                parked: Some(Box::new(body)),
            })),
        }
    }

    /// Returns the next value, running the producer inline if needed.
    ///
    /// # Errors
    /// [`GeneratorError::Exhausted`] if the body finished without producing another value.
    pub fn consume(&mut self) -> Result<Y, GeneratorError> {
        let step = {
            let mut state = self.state.borrow_mut();
            if let Some(value) = state.value.take() {
                return Ok(value);
            }

            let Some(step) = state.parked.take() else {
                return Err(GeneratorError::Exhausted);
            };
            step
        };

        // The state must not be borrowed here: the step borrows it again in `produce`.
        let flow = step(Producer {
            state: self.state.clone(),
        });

        let mut state = self.state.borrow_mut();
        if flow.is_finished() {
            state.parked = None;
        }

        state.value.take().ok_or(GeneratorError::Exhausted)
    }

    /// Returns `true` once the body has finished and no value is waiting.
    pub fn is_exhausted(&self) -> bool {
        let state = self.state.borrow();
        state.value.is_none() && state.parked.is_none()
    }
}

impl<Y: 'static> Iterator for Generator<Y> {
    type Item = Y;

    fn next(&mut self) -> Option<Y> {
        self.consume().ok()
    }
}

impl<Y> fmt::Debug for Generator<Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Generator")
            .field("has_value", &state.value.is_some())
            .field("parked", &state.parked.is_some())
            .finish()
    }
}
