//! Runtime subsystem modules.

pub(crate) mod action;
mod core;
mod handle;
pub(crate) mod queue;
pub(crate) mod worker;

pub use self::core::Runtime;
pub use handle::Handle;
