use mutative_json_pointer::PathStep;
use mutative_util::Value;

use super::handle::typed_handle;
use super::{Draft, DraftId, DraftRef, Slot, WorkingCopy};
use crate::record::{Arg, Operation};

/// Ledger key of the array length.
pub(crate) const LENGTH: &str = "length";

/// Write handle for an array draft.
///
/// Index writes past the end pad the gap with `Undefined` holes.
#[derive(Debug)]
pub struct ArrayDraft<'a> {
    pub(crate) inner: DraftRef<'a>,
}

typed_handle!(ArrayDraft);

pub(crate) fn index_key(index: usize) -> Value {
    Value::from(index.to_string())
}

impl Draft {
    fn array_slots(&mut self, id: DraftId) -> Option<&mut Vec<Slot>> {
        match self.copy_mut(id) {
            WorkingCopy::Array(slots) => Some(slots),
            _ => None,
        }
    }

    /// Marks every index from `start` up to the larger of both lengths:
    /// `true` below the new length, `false` past it. A length change also
    /// marks `"length"`.
    fn mark_range(&mut self, id: DraftId, start: usize, old_len: usize, new_len: usize) {
        for index in start..old_len.max(new_len) {
            self.assign(id, index_key(index), index < new_len);
        }
        if old_len != new_len {
            self.assign(id, Value::from(LENGTH), true);
        }
    }
}

impl<'a> ArrayDraft<'a> {
    pub fn get(&self, index: usize) -> Option<Value> {
        self.get_at(index)
    }

    pub fn child(&mut self, index: usize) -> Option<DraftRef<'_>> {
        self.inner.child(index)
    }

    /// Writes `value` at `index`.
    pub fn set(&mut self, index: usize, value: Value) {
        let (draft, id) = self.inner.parts();
        if draft.is_recording() {
            let args = vec![Arg::Literal(value.clone())];
            draft.record(id, Operation::Set, Some(PathStep::Index(index)), args);
        }
        self.write(index, value);
    }

    /// Writes the current value at `from` into `index`, recording the source
    /// path. Returns `false` if `from` does not resolve.
    pub fn set_from(&mut self, index: usize, from: &[PathStep]) -> bool {
        let (draft, id) = self.inner.parts();
        let Some(value) = draft.value_at(from) else {
            return false;
        };
        draft.record(id, Operation::Set, Some(PathStep::Index(index)), vec![Arg::Path(from.to_vec())]);
        self.write(index, value);
        true
    }

    fn write(&mut self, index: usize, value: Value) {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        let Some(slots) = draft.array_slots(id) else {
            return;
        };
        if index >= len {
            slots.resize(index + 1, Slot::Value(Value::Undefined));
        }
        slots[index] = Slot::Value(value);
        if index >= len {
            draft.mark_range(id, len, len, index + 1);
        }
        draft.assign(id, index_key(index), true);
        draft.mark_changed(id);
    }

    /// Leaves an `Undefined` hole at `index`. The length is unchanged.
    pub fn delete(&mut self, index: usize) -> bool {
        let (draft, id) = self.inner.parts();
        if index >= draft.len_of(id) {
            return false;
        }
        draft.record(id, Operation::Delete, Some(PathStep::Index(index)), Vec::new());
        if let Some(slots) = draft.array_slots(id) {
            slots[index] = Slot::Value(Value::Undefined);
        }
        draft.assign(id, index_key(index), true);
        draft.mark_changed(id);
        true
    }

    /// Appends `values`, returning the new length.
    pub fn push(&mut self, values: Vec<Value>) -> usize {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        if values.is_empty() {
            return len;
        }
        draft.record(id, Operation::Push, None, literal_args(&values));
        let Some(slots) = draft.array_slots(id) else {
            return len;
        };
        slots.extend(values.into_iter().map(Slot::Value));
        let new_len = slots.len();
        draft.mark_range(id, len, len, new_len);
        draft.mark_changed(id);
        new_len
    }

    pub fn pop(&mut self) -> Option<Value> {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        if len == 0 {
            return None;
        }
        draft.record(id, Operation::Pop, None, Vec::new());
        let slot = draft.array_slots(id)?.pop()?;
        draft.mark_range(id, len - 1, len, len - 1);
        draft.mark_changed(id);
        Some(draft.slot_value(&slot))
    }

    pub fn shift(&mut self) -> Option<Value> {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        if len == 0 {
            return None;
        }
        draft.record(id, Operation::Shift, None, Vec::new());
        let slot = draft.array_slots(id)?.remove(0);
        draft.mark_range(id, 0, len, len - 1);
        draft.mark_changed(id);
        Some(draft.slot_value(&slot))
    }

    /// Prepends `values`, returning the new length.
    pub fn unshift(&mut self, values: Vec<Value>) -> usize {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        if values.is_empty() {
            return len;
        }
        draft.record(id, Operation::Unshift, None, literal_args(&values));
        let Some(slots) = draft.array_slots(id) else {
            return len;
        };
        slots.splice(0..0, values.into_iter().map(Slot::Value));
        let new_len = slots.len();
        draft.mark_range(id, 0, len, new_len);
        draft.mark_changed(id);
        new_len
    }

    /// Removes `delete_count` items from `start` and inserts `items` there.
    /// Both bounds are clamped to the array. Returns the removed items.
    pub fn splice(&mut self, start: usize, delete_count: usize, items: Vec<Value>) -> Vec<Value> {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        let start = start.min(len);
        let delete_count = delete_count.min(len - start);
        if delete_count == 0 && items.is_empty() {
            return Vec::new();
        }
        if draft.is_recording() {
            let mut args = vec![Arg::Literal(Value::from(start)), Arg::Literal(Value::from(delete_count))];
            args.extend(literal_args(&items));
            draft.record(id, Operation::Splice, None, args);
        }
        let Some(slots) = draft.array_slots(id) else {
            return Vec::new();
        };
        let removed: Vec<Slot> = slots
            .splice(start..start + delete_count, items.into_iter().map(Slot::Value))
            .collect();
        let new_len = slots.len();
        draft.mark_range(id, start, len, new_len);
        draft.mark_changed(id);
        removed.iter().map(|slot| draft.slot_value(slot)).collect()
    }

    /// Inserts `value` before `index`, appending when `index` is past the end.
    pub fn insert(&mut self, index: usize, value: Value) {
        self.splice(index, 0, vec![value]);
    }

    /// Truncates or pads with holes to `new_len`.
    pub fn set_len(&mut self, new_len: usize) {
        let (draft, id) = self.inner.parts();
        let len = draft.len_of(id);
        if new_len == len {
            return;
        }
        draft.record(
            id,
            Operation::Set,
            Some(PathStep::from(LENGTH)),
            vec![Arg::Literal(Value::from(new_len))],
        );
        let Some(slots) = draft.array_slots(id) else {
            return;
        };
        slots.resize(new_len, Slot::Value(Value::Undefined));
        draft.mark_range(id, len.min(new_len), len, new_len);
        draft.mark_changed(id);
    }
}

fn literal_args(values: &[Value]) -> Vec<Arg> {
    values.iter().cloned().map(Arg::Literal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(items: &[i32]) -> Value {
        Value::array(items.iter().map(|&n| Value::from(n)))
    }

    fn ledger(draft: &Draft) -> Vec<(String, bool)> {
        draft.drafts[0]
            .assigned
            .iter()
            .map(|(k, v)| (k.as_str().unwrap_or_default().to_string(), *v))
            .collect()
    }

    fn entry(key: &str, flag: bool) -> (String, bool) {
        (key.to_string(), flag)
    }

    #[test]
    fn test_push_marks_new_indices_and_length() {
        let base = nums(&[1, 2]);
        let mut draft = Draft::new(&base, false).unwrap();
        assert_eq!(draft.root().array().unwrap().push(vec![Value::from(3)]), 3);
        assert_eq!(ledger(&draft), vec![entry("2", true), entry("length", true)]);
        assert_eq!(draft.current(), nums(&[1, 2, 3]));
    }

    #[test]
    fn test_pop_marks_removed_index_false() {
        let base = nums(&[1, 2, 3]);
        let mut draft = Draft::new(&base, false).unwrap();
        assert_eq!(draft.root().array().unwrap().pop(), Some(Value::from(3)));
        assert_eq!(ledger(&draft), vec![entry("2", false), entry("length", true)]);
    }

    #[test]
    fn test_shift_marks_every_moved_index() {
        let base = nums(&[1, 2, 3]);
        let mut draft = Draft::new(&base, false).unwrap();
        assert_eq!(draft.root().array().unwrap().shift(), Some(Value::from(1)));
        assert_eq!(
            ledger(&draft),
            vec![entry("0", true), entry("1", true), entry("2", false), entry("length", true)]
        );
        assert_eq!(draft.current(), nums(&[2, 3]));
    }

    #[test]
    fn test_unshift_and_splice() {
        let base = nums(&[1, 2, 3]);
        let mut draft = Draft::new(&base, false).unwrap();
        let mut arr = draft.root().array().unwrap();
        assert_eq!(arr.unshift(vec![Value::from(0)]), 4);
        assert_eq!(arr.splice(1, 2, vec![Value::from(9)]), vec![Value::from(1), Value::from(2)]);
        assert_eq!(arr.current(), nums(&[0, 9, 3]));
        assert!(arr.splice(10, 1, Vec::new()).is_empty());
        arr.insert(99, Value::from(4));
        assert_eq!(arr.current(), nums(&[0, 9, 3, 4]));
    }

    #[test]
    fn test_set_past_end_pads_holes() {
        let base = nums(&[1]);
        let mut draft = Draft::new(&base, false).unwrap();
        draft.root().array().unwrap().set(3, Value::from(4));
        assert_eq!(
            draft.current(),
            Value::array([Value::from(1), Value::Undefined, Value::Undefined, Value::from(4)])
        );
        assert_eq!(draft.drafts[0].assigned.get(&Value::from("1")), Some(&true));
        assert_eq!(draft.drafts[0].assigned.get(&Value::from("length")), Some(&true));
    }

    #[test]
    fn test_delete_leaves_hole() {
        let base = nums(&[1, 2]);
        let mut draft = Draft::new(&base, false).unwrap();
        let mut arr = draft.root().array().unwrap();
        assert!(arr.delete(0));
        assert!(!arr.delete(5));
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(0), Some(Value::Undefined));
    }

    #[test]
    fn test_set_len() {
        let base = nums(&[1, 2, 3]);
        let mut draft = Draft::new(&base, false).unwrap();
        let mut arr = draft.root().array().unwrap();
        arr.set_len(1);
        assert_eq!(arr.current(), nums(&[1]));
        arr.set_len(2);
        assert_eq!(arr.current(), Value::array([Value::from(1), Value::Undefined]));
    }

    #[test]
    fn test_empty_pop_and_shift() {
        let base = nums(&[]);
        let mut draft = Draft::new(&base, false).unwrap();
        let mut arr = draft.root().array().unwrap();
        assert_eq!(arr.pop(), None);
        assert_eq!(arr.shift(), None);
        assert!(!draft.drafts[0].operated);
    }
}
