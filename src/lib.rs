//! Minimal cooperative coroutine runtime built on explicit continuations.
//!
//! Computations are written as chains of steps. Each step either finishes the
//! computation or suspends it for a while, handing the rest of the work to the
//! runtime as a closure. The runtime keeps those closures in a ready queue
//! ordered by the instant they become runnable, and a small pool of worker
//! threads runs them when they are due.
//!
//! # Architecture
//!
//! - **Runtime**: Owns the ready queue and the worker pool; explicit shutdown
//! - **RuntimeBuilder**: Fluent configuration of pool size and poll interval
//! - **Handle**: Clonable access to a runtime from other threads
//! - **ReadyQueue**: Thread-safe min-heap of timed actions
//! - **Co / Step**: Computation context and the result of one step; `Co::sleep` is the suspension point
//! - **Bridge**: One-shot delivery of a computation's outcome to its caller
//! - **Generator**: Pull-driven producer resumed inline by its consumer
//!
//! # Example
//!
//! ```ignore
//! use coro::{Runtime, Step};
//!
//! let rt = Runtime::new();
//! let bridge = rt.start(|co| {
//!     co.sleep(50, |co, first| {
//!         co.sleep(0, move |_, second| Step::done((first.as_millis(), second.as_millis())))
//!     })
//! });
//! let (slept, fast_path) = bridge.wait().unwrap();
//! assert!(slept >= 50);
//! assert_eq!(fast_path, -1);
//! rt.shutdown();
//! ```

pub mod bridge;
mod builder;
mod coroutine;
mod error;
mod generator;
mod runtime;

pub use bridge::{Bridge, Completer, Outcome};
pub use builder::RuntimeBuilder;
pub use coroutine::{Co, Resumed, Step};
pub use error::{BoxError, BridgeError, BuildError, Failure, GeneratorError};
pub use generator::{Flow, Generator, Producer};
pub use runtime::{Handle, Runtime};
