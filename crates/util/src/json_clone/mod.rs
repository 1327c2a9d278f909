//! Deep cloning.

mod clone;

pub use clone::deep_clone;
