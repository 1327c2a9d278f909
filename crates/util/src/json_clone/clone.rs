use std::sync::Arc;

use crate::node::Node;
use crate::value::Value;

/// Creates a deep clone of a value.
///
/// Unlike `Value::clone`, which shares container nodes, every container in
/// the result is a fresh, unfrozen node owned by nobody else. Patches store
/// values produced by this function so that they stay valid independently
/// of the tree they were taken from.
///
/// # Examples
///
/// ```
/// use mutative_util::{deep_clone, Value};
///
/// let original = Value::object([("foo", Value::array([Value::from(1)]))]);
/// let cloned = deep_clone(&original);
///
/// assert_eq!(original, cloned);
/// assert!(!original.ptr_eq(&cloned));
/// ```
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Undefined,
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(*n),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(arr) => Value::Array(Arc::new(Node::new(arr.iter().map(deep_clone).collect()))),
        Value::Object(obj) => Value::Object(Arc::new(Node::new(
            obj.iter().map(|(k, v)| (k.clone(), deep_clone(v))).collect(),
        ))),
        Value::Map(map) => Value::Map(Arc::new(Node::new(
            map.iter().map(|(k, v)| (deep_clone(k), deep_clone(v))).collect(),
        ))),
        Value::Set(set) => Value::Set(Arc::new(Node::new(set.iter().map(deep_clone).collect()))),
    }
}
