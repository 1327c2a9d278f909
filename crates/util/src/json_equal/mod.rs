//! Deep structural equality.

mod deep_equal;

pub use deep_equal::{deep_equal, same_value_zero};
