//! Deep freeze guard.
//!
//! Freezing sets the frozen flag on every container node reachable from a
//! value. Frozen nodes reject all writes with [`WriteError::Frozen`]; the
//! flag can never be cleared. Drafts taken over a frozen value work on fresh
//! copies, so freezing a state never stops it from being the base of the
//! next one.
//!
//! Map keys are not frozen, only map values.
//!
//! [`WriteError::Frozen`]: mutative_util::WriteError::Frozen

use mutative_util::Value;

/// Recursively freezes `value` in place.
///
/// Scalars are ignored. A node that is already frozen is skipped without
/// descending into it.
pub fn freeze(value: &Value) {
    match value {
        Value::Object(node) => {
            if node.freeze() {
                node.values().for_each(freeze);
            }
        }
        Value::Array(node) => {
            if node.freeze() {
                node.iter().for_each(freeze);
            }
        }
        Value::Map(node) => {
            if node.freeze() {
                node.values().for_each(freeze);
            }
        }
        Value::Set(node) => {
            if node.freeze() {
                node.iter().for_each(freeze);
            }
        }
        _ => {}
    }
}

/// Whether `value` is frozen. Scalars always are.
pub fn is_frozen(value: &Value) -> bool {
    value.is_frozen()
}
