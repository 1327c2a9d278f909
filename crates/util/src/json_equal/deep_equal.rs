use std::sync::Arc;

use crate::value::Value;

/// Number equality with SameValueZero semantics: `NaN` equals `NaN` and
/// `0.0` equals `-0.0`.
pub fn same_value_zero(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Performs a deep structural equality check between two values.
///
/// - Arrays compare element by element, in order.
/// - Objects and maps compare as key/value sets; insertion order is ignored.
/// - Sets compare by membership; insertion order is ignored.
/// - Shared nodes short-circuit to `true`.
/// - The frozen flag never takes part in equality.
///
/// # Examples
///
/// ```
/// use mutative_util::{deep_equal, Value};
///
/// let a = Value::object([("foo", Value::array([Value::from(1), Value::from(2)]))]);
/// let b = Value::object([("foo", Value::array([Value::from(1), Value::from(2)]))]);
/// let c = Value::object([("foo", Value::array([Value::from(2), Value::from(1)]))]);
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => same_value_zero(*a, *b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(a), Value::Array(b)) => {
            Arc::ptr_eq(a, b)
                || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| deep_equal(x, y)))
        }

        (Value::Object(a), Value::Object(b)) => {
            if Arc::ptr_eq(a, b) {
                return true;
            }
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }

        (Value::Map(a), Value::Map(b)) => {
            if Arc::ptr_eq(a, b) {
                return true;
            }
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }

        (Value::Set(a), Value::Set(b)) => {
            Arc::ptr_eq(a, b) || (a.len() == b.len() && a.iter().all(|m| b.contains(m)))
        }

        // Different types are never equal
        _ => false,
    }
}
