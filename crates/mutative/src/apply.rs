//! Replaying recorded entries.
//!
//! Each [`RecordedEntry`] is re-executed through a draft session over the
//! base, in order. Array methods resolve their container from the full
//! path. Every other operation resolves it from every path step but the
//! last; member operations use that last step as key, index or position,
//! while map and set `clear`/`construct` ignore it. Unresolvable paths are
//! skipped.

use mutative_json_pointer::{format_json_pointer, PathStep};
use mutative_util::{deep_clone, Value};
use tracing::debug;

use crate::draft::{create, value_step, Draft, DraftRef, LENGTH};
use crate::patch::{array_length, map_pair};
use crate::record::{Arg, Operation, RecordedEntry};
use crate::types::{ApplyOptions, DraftType, MutativeError};

/// Replays `entries` against `base` and returns the new state.
///
/// Literal arguments are deep-cloned before use; path arguments resolve to
/// the current value at that path when the entry runs.
///
/// ```
/// use mutative::{apply, create, ApplyOptions, Options};
/// use mutative_util::Value;
///
/// let base = Value::object([("n", Value::from(1))]);
/// let options = Options { record: true, ..Options::default() };
/// let produced = create(
///     &base,
///     |draft| {
///         draft.root().object()?.set("n", Value::from(2));
///         Ok(())
///     },
///     &options,
/// )
/// .unwrap();
/// let replayed = apply(&base, &produced.recorded, &ApplyOptions::default()).unwrap();
/// assert_eq!(replayed, produced.state);
/// ```
pub fn apply(
    base: &Value,
    entries: &[RecordedEntry],
    options: &ApplyOptions,
) -> Result<Value, MutativeError> {
    let produced = create(
        base,
        |draft| {
            for entry in entries {
                replay_entry(draft, entry)?;
            }
            Ok(())
        },
        &options.into(),
    )?;
    Ok(produced.state)
}

/// Positional lookup into a plain value: object keys, array indices, map
/// entry positions (yielding the entry's value) and set member positions.
///
/// ```
/// use mutative::get_value;
/// use mutative_json_pointer::PathStep;
/// use mutative_util::Value;
///
/// let v = Value::map([(Value::from("k"), Value::array([Value::from(7)]))]);
/// let path = [PathStep::Index(0), PathStep::Index(0)];
/// assert_eq!(get_value(&v, &path), Some(&Value::from(7)));
/// ```
pub fn get_value<'a>(value: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, step| value_step(current, step))
}

fn replay_entry(draft: &mut Draft, entry: &RecordedEntry) -> Result<(), MutativeError> {
    if !entry.operation.applies_to(entry.target) {
        return Err(unsupported(entry.operation, entry.target));
    }
    let args: Vec<Value> = entry
        .args
        .iter()
        .map(|arg| match arg {
            Arg::Literal(value) => deep_clone(value),
            Arg::Path(path) => draft.value_at(path).unwrap_or_default(),
        })
        .collect();

    for path in &entry.paths {
        if entry.operation.is_array_method() {
            let Some(target) = resolve(draft, path, entry.target) else {
                continue;
            };
            replay_whole(target, entry.operation, &args)?;
            break;
        }
        let Some((last, parent)) = path.split_last() else {
            debug!(op = entry.operation.as_str(), "skipping entry without a trailing step");
            continue;
        };
        let Some(target) = resolve(draft, parent, entry.target) else {
            continue;
        };
        if entry.operation.is_whole_container() {
            replay_whole(target, entry.operation, &args)?;
        } else {
            replay_member(target, entry.operation, last, &args)?;
        }
    }
    Ok(())
}

fn resolve<'a>(draft: &'a mut Draft, path: &[PathStep], target: DraftType) -> Option<DraftRef<'a>> {
    let Some(found) = draft.at(path) else {
        debug!(path = %format_json_pointer(path), "skipping entry, container not found");
        return None;
    };
    if found.kind() != target {
        debug!(
            path = %format_json_pointer(path),
            expected = %target,
            found = %found.kind(),
            "skipping entry, container type differs"
        );
        return None;
    }
    Some(found)
}

fn arg(args: &[Value], index: usize) -> Result<Value, MutativeError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| MutativeError::InvalidArgument(format!("missing argument {index}")))
}

fn replay_member(
    target: DraftRef<'_>,
    operation: Operation,
    step: &PathStep,
    args: &[Value],
) -> Result<(), MutativeError> {
    match target.kind() {
        DraftType::Object => {
            let mut object = target.object()?;
            match operation {
                Operation::Set => object.set(step.to_key(), arg(args, 0)?),
                Operation::Delete => {
                    object.delete(&step.to_key());
                }
                other => return Err(unsupported(other, DraftType::Object)),
            }
        }
        DraftType::Array => {
            let mut array = target.array()?;
            match (operation, step) {
                (Operation::Set, PathStep::Key(key)) if key == LENGTH => {
                    array.set_len(array_length(&arg(args, 0)?)?);
                }
                (Operation::Set, _) => {
                    let index = index_of(step)?;
                    array.set(index, arg(args, 0)?);
                }
                (Operation::Delete, _) => {
                    array.delete(index_of(step)?);
                }
                (other, _) => return Err(unsupported(other, DraftType::Array)),
            }
        }
        DraftType::Map => {
            let mut map = target.map()?;
            let position = index_of(step)?;
            match operation {
                Operation::Set => map.set_at(position, arg(args, 0)?, arg(args, 1)?),
                Operation::Delete => {
                    map.delete_at(position);
                }
                other => return Err(unsupported(other, DraftType::Map)),
            }
        }
        DraftType::Set => {
            let mut set = target.set()?;
            let position = index_of(step)?;
            match operation {
                Operation::Add => {
                    set.add_at(position, arg(args, 0)?);
                }
                Operation::Delete => {
                    set.delete_at(position);
                }
                other => return Err(unsupported(other, DraftType::Set)),
            }
        }
    }
    Ok(())
}

fn unsupported(operation: Operation, target: DraftType) -> MutativeError {
    MutativeError::InvalidArgument(format!(
        "{} is not a {} operation",
        operation.as_str(),
        target
    ))
}

fn replay_whole(
    target: DraftRef<'_>,
    operation: Operation,
    args: &[Value],
) -> Result<(), MutativeError> {
    match target.kind() {
        DraftType::Array => {
            let mut array = target.array()?;
            match operation {
                Operation::Push => {
                    array.push(args.to_vec());
                }
                Operation::Pop => {
                    array.pop();
                }
                Operation::Shift => {
                    array.shift();
                }
                Operation::Unshift => {
                    array.unshift(args.to_vec());
                }
                Operation::Splice => {
                    let (start, delete_count) = splice_bounds(array.len(), args)?;
                    let items = args.iter().skip(2).cloned().collect();
                    array.splice(start, delete_count, items);
                }
                other => return Err(unsupported(other, DraftType::Array)),
            }
        }
        DraftType::Map => {
            let mut map = target.map()?;
            match operation {
                Operation::Clear => map.clear(),
                Operation::Construct => {
                    let entries = args.iter().map(map_pair).collect::<Result<Vec<_>, _>>()?;
                    map.construct(entries);
                }
                other => return Err(unsupported(other, DraftType::Map)),
            }
        }
        DraftType::Set => {
            let mut set = target.set()?;
            match operation {
                Operation::Clear => set.clear(),
                Operation::Construct => set.construct(args.to_vec()),
                other => return Err(unsupported(other, DraftType::Set)),
            }
        }
        DraftType::Object => return Err(unsupported(operation, DraftType::Object)),
    }
    Ok(())
}

fn index_of(step: &PathStep) -> Result<usize, MutativeError> {
    step.as_index()
        .ok_or_else(|| MutativeError::InvalidArgument(format!("expected an index, found {step}")))
}

/// Start and delete count of a splice. A negative start counts from the
/// end; a missing delete count removes everything after `start`.
fn splice_bounds(len: usize, args: &[Value]) -> Result<(usize, usize), MutativeError> {
    let number = |index: usize| -> Result<Option<f64>, MutativeError> {
        match args.get(index) {
            None | Some(Value::Undefined) => Ok(None),
            Some(Value::Number(n)) if !n.is_nan() => Ok(Some(n.trunc())),
            Some(other) => Err(MutativeError::InvalidArgument(format!(
                "splice expects numeric bounds, found {}",
                other.kind().as_str()
            ))),
        }
    };
    let len_f = len as f64;
    let start = match number(0)? {
        None => 0.0,
        Some(n) if n < 0.0 => (len_f + n).max(0.0),
        Some(n) => n.min(len_f),
    };
    let delete_count = match number(1)? {
        None if args.is_empty() => 0.0,
        None => len_f - start,
        Some(n) => n.clamp(0.0, len_f - start),
    };
    Ok((start as usize, delete_count as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn n(v: i32) -> Value {
        Value::from(v)
    }

    fn k(s: &str) -> PathStep {
        PathStep::from(s)
    }

    fn entry(target: DraftType, operation: Operation, path: Vec<PathStep>, args: Vec<Value>) -> RecordedEntry {
        RecordedEntry::new(target, operation, path, args.into_iter().map(Arg::Literal).collect())
    }

    fn replay(base: &Value, entries: &[RecordedEntry]) -> Value {
        apply(base, entries, &ApplyOptions::default()).unwrap()
    }

    #[test]
    fn test_object_set_and_delete() {
        let base = Value::object([("a", n(1)), ("b", n(2))]);
        let next = replay(
            &base,
            &[
                entry(DraftType::Object, Operation::Set, vec![k("c")], vec![n(3)]),
                entry(DraftType::Object, Operation::Delete, vec![k("a")], vec![]),
            ],
        );
        assert_eq!(next, Value::object([("b", n(2)), ("c", n(3))]));
    }

    #[test]
    fn test_array_methods() {
        let base = Value::object([("list", Value::array([n(1), n(2), n(3)]))]);
        let list = || vec![k("list")];
        let next = replay(
            &base,
            &[
                entry(DraftType::Array, Operation::Push, list(), vec![n(4)]),
                entry(DraftType::Array, Operation::Shift, list(), vec![]),
                entry(DraftType::Array, Operation::Unshift, list(), vec![n(0)]),
                entry(DraftType::Array, Operation::Splice, list(), vec![n(-2), n(1), n(9)]),
                entry(DraftType::Array, Operation::Pop, list(), vec![]),
            ],
        );
        // [1,2,3] push 4 -> [1,2,3,4]; shift -> [2,3,4]; unshift 0 -> [0,2,3,4];
        // splice(-2, 1, 9) -> [0,2,9,4]; pop -> [0,2,9]
        assert_eq!(next.get("list"), Some(&Value::array([n(0), n(2), n(9)])));
    }

    #[test]
    fn test_array_method_stops_after_first_resolved_path() {
        let base = Value::object([("a", Value::array([])), ("b", Value::array([]))]);
        let mut push = entry(DraftType::Array, Operation::Push, vec![k("missing")], vec![n(1)]);
        push.paths.push(vec![k("a")]);
        push.paths.push(vec![k("b")]);
        let next = replay(&base, &[push]);
        assert_eq!(next.get("a").unwrap().len(), 1);
        assert_eq!(next.get("b").unwrap().len(), 0);
    }

    #[test]
    fn test_root_array_method() {
        let base = Value::array([n(1)]);
        let next = replay(&base, &[entry(DraftType::Array, Operation::Push, vec![], vec![n(2)])]);
        assert_eq!(next, Value::array([n(1), n(2)]));
    }

    #[test]
    fn test_map_set_at_position() {
        let key = |s: &str| Value::from(s);
        let base = Value::map([(key("a"), n(1)), (key("b"), n(2))]);
        let next = replay(
            &base,
            &[
                entry(DraftType::Map, Operation::Set, vec![PathStep::Index(0)], vec![key("z"), n(26)]),
                entry(DraftType::Map, Operation::Set, vec![PathStep::Index(9)], vec![key("c"), n(3)]),
            ],
        );
        let keys: Vec<Value> = next.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![key("z"), key("b"), key("c")]);
    }

    #[test]
    fn test_set_add_at_position() {
        let base = Value::object([("s", Value::set([n(1), n(2)]))]);
        let next = replay(
            &base,
            &[
                entry(DraftType::Set, Operation::Add, vec![k("s"), PathStep::Index(1)], vec![n(5)]),
                entry(DraftType::Set, Operation::Delete, vec![k("s"), PathStep::Index(0)], vec![]),
            ],
        );
        let members: Vec<Value> = next.get("s").unwrap().as_set().unwrap().iter().cloned().collect();
        assert_eq!(members, vec![n(5), n(2)]);
    }

    #[test]
    fn test_map_clear_drops_trailing_step() {
        let base = Value::object([("m", Value::map([(Value::from("a"), n(1))]))]);
        let clear = crate::record::codec::from_json(&serde_json::json!([[2, "clear"], [["m", 0]], []]))
            .unwrap();
        let next = replay(&base, &[clear]);
        assert_eq!(next.get("m"), Some(&Value::map(Vec::new())));
    }

    #[test]
    fn test_set_construct_and_clear_at_root() {
        let base = Value::set([n(1)]);
        let at = || vec![PathStep::Index(0)];
        let next = replay(
            &base,
            &[entry(DraftType::Set, Operation::Construct, at(), vec![n(3), n(4), n(3)])],
        );
        assert_eq!(next, Value::set([n(3), n(4)]));
        let next = replay(&base, &[entry(DraftType::Set, Operation::Clear, at(), vec![])]);
        assert_eq!(next, Value::set(Vec::new()));
    }

    #[test]
    fn test_member_replay_rejects_other_operations() {
        let base = Value::object([("a", n(1))]);
        let result = create(
            &base,
            |draft| replay_member(draft.root(), Operation::Clear, &k("a"), &[]),
            &Options::default(),
        );
        assert!(matches!(result, Err(MutativeError::InvalidArgument(_))));
        let next = replay(&base, &[entry(DraftType::Object, Operation::Delete, vec![k("a")], vec![])]);
        assert_eq!(next, Value::object::<&str>([]));
    }

    #[test]
    fn test_recorded_clear_and_construct_replay() {
        let base = Value::object([
            ("m", Value::map([(Value::from("a"), n(1))])),
            ("s", Value::set([n(1), n(2)])),
        ]);
        let options = Options {
            record: true,
            ..Options::default()
        };
        let produced = create(
            &base,
            |draft| {
                let mut root = draft.root().object()?;
                root.child("m").unwrap().map()?.clear();
                let mut root = draft.root().object()?;
                root.child("s").unwrap().set()?.construct(vec![n(7)]);
                Ok(())
            },
            &options,
        )
        .unwrap();
        assert_eq!(produced.recorded[0].paths, vec![vec![k("m"), PathStep::Index(0)]]);
        let replayed = apply(&base, &produced.recorded, &ApplyOptions::default()).unwrap();
        assert_eq!(replayed, produced.state);
        assert_eq!(replayed.get("s"), Some(&Value::set([n(7)])));
    }

    #[test]
    fn test_path_argument_resolves_current_value() {
        let base = Value::object([("src", Value::object([("x", n(1))]))]);
        let copy = RecordedEntry::new(
            DraftType::Object,
            Operation::Set,
            vec![k("dst")],
            vec![Arg::Path(vec![k("src")])],
        );
        let next = replay(&base, &[copy]);
        assert_eq!(next.get("dst"), base.get("src"));
    }

    #[test]
    fn test_unresolved_path_is_skipped() {
        let base = Value::object([("a", n(1))]);
        let next = replay(
            &base,
            &[entry(DraftType::Object, Operation::Set, vec![k("x"), k("y")], vec![n(1)])],
        );
        assert!(next.ptr_eq(&base));
    }

    #[test]
    fn test_invalid_splice_arguments() {
        let base = Value::array([n(1)]);
        let err = apply(
            &base,
            &[entry(DraftType::Array, Operation::Splice, vec![], vec![Value::from("x")])],
            &ApplyOptions::default(),
        );
        assert!(matches!(err, Err(MutativeError::InvalidArgument(_))));
    }

    #[test]
    fn test_operation_must_fit_target() {
        let base = Value::object::<&str>([]);
        let err = apply(
            &base,
            &[entry(DraftType::Object, Operation::Push, vec![], vec![])],
            &ApplyOptions::default(),
        );
        assert!(matches!(err, Err(MutativeError::InvalidArgument(_))));
    }

    #[test]
    fn test_splice_bounds() {
        assert_eq!(splice_bounds(5, &[n(1), n(2)]).unwrap(), (1, 2));
        assert_eq!(splice_bounds(5, &[n(-1)]).unwrap(), (4, 1));
        assert_eq!(splice_bounds(5, &[n(9), n(9)]).unwrap(), (5, 0));
        assert_eq!(splice_bounds(5, &[]).unwrap(), (0, 0));
        assert_eq!(splice_bounds(5, &[n(2), n(-3)]).unwrap(), (2, 0));
    }

    #[test]
    fn test_recorded_session_replays() {
        let base = Value::object([
            ("list", Value::array([n(1), n(2)])),
            ("m", Value::map([(Value::from("k"), n(1))])),
        ]);
        let options = Options {
            record: true,
            ..Options::default()
        };
        let produced = create(
            &base,
            |draft| {
                let mut root = draft.root().object()?;
                root.set_from("copy", &[k("list")]);
                let mut list = root.child("list").unwrap().array()?;
                list.splice(0, 1, vec![n(7), n(8)]);
                list.set_len(5);
                let mut root = draft.root().object()?;
                let mut m = root.child("m").unwrap().map()?;
                m.insert_at(0, Value::from("first"), n(0));
                m.delete(&Value::from("k"));
                Ok(())
            },
            &options,
        )
        .unwrap();
        assert!(!produced.recorded.is_empty());
        let replayed = apply(&base, &produced.recorded, &ApplyOptions::default()).unwrap();
        assert_eq!(replayed, produced.state);
    }
}
