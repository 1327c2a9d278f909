//! Recorded draft operations.
//!
//! When [`crate::Options::record`] is set, every mutation performed through
//! a draft handle is appended to a log of [`RecordedEntry`] values. The log
//! can be serialized with [`codec`] and replayed with [`crate::apply`].

pub mod codec;
mod types;

pub use types::{Arg, Operation, RecordedEntry};
