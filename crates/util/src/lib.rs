//! mutative-util - value model and leaf utilities for mutative.
//!
//! - [`Value`]: the host value tree (objects, arrays, maps, sets, scalars)
//!   with `Arc`-shared, freezable container nodes.
//! - [`deep_equal`]: structural equality used for no-op suppression.
//! - [`deep_clone`]: materializes an unshared, unfrozen copy for patches.
//! - [`json`]: conversion to and from `serde_json::Value`.

pub mod json;
pub mod json_clone;
pub mod json_equal;
pub mod node;
pub mod value;

pub use json::{from_json, to_json};
pub use json_clone::deep_clone;
pub use json_equal::{deep_equal, same_value_zero};
pub use node::{Node, WriteError};
pub use value::{Array, Map, Object, Set, Value, ValueKind};
