//! Applying patch lists.
//!
//! Patches are replayed through a draft session, so the result shares every
//! untouched subtree with the base. Paths are resolved positionally; a patch
//! whose container does not resolve, or whose target member is missing for
//! a `replace`/`remove`, is skipped.

use mutative_json_pointer::{format_json_pointer, PathStep};
use mutative_util::Value;
use tracing::debug;

use super::types::{Patch, PatchOp};
use crate::draft::{create, Draft, LENGTH};
use crate::types::{ApplyOptions, DraftType, MutativeError};

/// Applies `patches` to `base` in order and returns the new state.
///
/// ```
/// use mutative::{apply_patches, ApplyOptions, Patch};
/// use mutative_json_pointer::PathStep;
/// use mutative_util::Value;
///
/// let base = Value::object([("a", Value::from(1))]);
/// let patches = vec![Patch::replace(vec![PathStep::from("a")], Value::from(2))];
/// let next = apply_patches(&base, &patches, &ApplyOptions::default()).unwrap();
/// assert_eq!(next.get("a"), Some(&Value::from(2)));
/// ```
pub fn apply_patches(
    base: &Value,
    patches: &[Patch],
    options: &ApplyOptions,
) -> Result<Value, MutativeError> {
    let produced = create(
        base,
        |draft| {
            for patch in patches {
                apply_patch(draft, patch)?;
            }
            Ok(())
        },
        &options.into(),
    )?;
    Ok(produced.state)
}

fn apply_patch(draft: &mut Draft, patch: &Patch) -> Result<(), MutativeError> {
    let Some((last, parent)) = patch.path.split_last() else {
        debug!(op = patch.op.as_str(), "skipping patch addressing the root");
        return Ok(());
    };
    let Some(target) = draft.at(parent) else {
        debug!(
            op = patch.op.as_str(),
            path = %format_json_pointer(&patch.path),
            "skipping patch, container not found"
        );
        return Ok(());
    };
    let value = || {
        patch
            .value
            .clone()
            .ok_or_else(|| MutativeError::InvalidArgument(format!("{} without value", patch.op.as_str())))
    };
    let applied = match target.kind() {
        DraftType::Object => {
            let mut object = target.object()?;
            let key = last.to_key();
            match patch.op {
                PatchOp::Add => {
                    object.set(key, value()?);
                    true
                }
                PatchOp::Replace if object.contains_key(&key) => {
                    object.set(key, value()?);
                    true
                }
                PatchOp::Replace => false,
                PatchOp::Remove => object.delete(&key),
            }
        }
        DraftType::Array => {
            let mut array = target.array()?;
            match (patch.op, last) {
                (PatchOp::Add | PatchOp::Replace, PathStep::Key(key)) if key == LENGTH => {
                    array.set_len(array_length(&value()?)?);
                    true
                }
                (op, step) => match (op, step.as_index()) {
                    (_, None) => false,
                    (PatchOp::Add, Some(index)) => {
                        array.insert(index, value()?);
                        true
                    }
                    (PatchOp::Replace, Some(index)) => {
                        array.set(index, value()?);
                        true
                    }
                    (PatchOp::Remove, Some(index)) => !array.splice(index, 1, Vec::new()).is_empty(),
                },
            }
        }
        DraftType::Map => {
            let mut map = target.map()?;
            match (patch.op, last.as_index()) {
                (_, None) => false,
                (PatchOp::Add, Some(position)) => {
                    let (key, entry) = map_pair(&value()?)?;
                    map.insert_at(position, key, entry);
                    true
                }
                (PatchOp::Replace, Some(position)) => map.replace_at(position, value()?),
                (PatchOp::Remove, Some(position)) => map.delete_at(position),
            }
        }
        DraftType::Set => {
            let mut set = target.set()?;
            match (patch.op, last.as_index()) {
                (_, None) => false,
                (PatchOp::Add, Some(position)) => set.add_at(position, value()?),
                (PatchOp::Replace, Some(position)) => set.replace_at(position, value()?),
                (PatchOp::Remove, Some(position)) => set.delete_at(position),
            }
        }
    };
    if !applied {
        debug!(
            op = patch.op.as_str(),
            path = %format_json_pointer(&patch.path),
            "patch had no effect"
        );
    }
    Ok(())
}

pub(crate) fn array_length(value: &Value) -> Result<usize, MutativeError> {
    match value.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as usize),
        _ => Err(MutativeError::InvalidArgument(format!(
            "invalid array length: {}",
            value.kind().as_str()
        ))),
    }
}

pub(crate) fn map_pair(value: &Value) -> Result<(Value, Value), MutativeError> {
    match value.as_array().map(Vec::as_slice) {
        Some([key, entry]) => Ok((key.clone(), entry.clone())),
        _ => Err(MutativeError::InvalidArgument(
            "map add expects a [key, value] pair".into(),
        )),
    }
}
