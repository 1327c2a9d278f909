use mutative_json_pointer::{Path, PathStep};
use mutative_util::Value;

use super::handle::typed_handle;
use super::{DraftRef, Slot, WorkingCopy};
use crate::record::{Arg, Operation};

/// Write handle for an object draft.
#[derive(Debug)]
pub struct ObjectDraft<'a> {
    pub(crate) inner: DraftRef<'a>,
}

typed_handle!(ObjectDraft);

impl<'a> ObjectDraft<'a> {
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match self.draft.copy_ref(self.id) {
            Some(WorkingCopy::Object(entries)) => entries.contains_key(key),
            _ => self.original().get(key).is_some(),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        match self.draft.copy_ref(self.id) {
            Some(WorkingCopy::Object(entries)) => entries.keys().cloned().collect(),
            _ => self
                .original()
                .as_object()
                .map(|o| o.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }

    pub fn child(&mut self, key: &str) -> Option<DraftRef<'_>> {
        self.inner.child(key)
    }

    /// Sets `key`, adding it at the end if it is new.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let (draft, id) = self.inner.parts();
        if draft.is_recording() {
            let args = vec![Arg::Literal(value.clone())];
            draft.record(id, Operation::Set, Some(PathStep::Key(key.clone())), args);
        }
        self.write(key, value);
    }

    /// Sets `key` to the current value at `from`, recording the source path
    /// instead of the value. Returns `false` if `from` does not resolve.
    pub fn set_from(&mut self, key: impl Into<String>, from: &[PathStep]) -> bool {
        let key = key.into();
        let (draft, id) = self.inner.parts();
        let Some(value) = draft.value_at(from) else {
            return false;
        };
        let from: Path = from.to_vec();
        draft.record(id, Operation::Set, Some(PathStep::Key(key.clone())), vec![Arg::Path(from)]);
        self.write(key, value);
        true
    }

    fn write(&mut self, key: String, value: Value) {
        let (draft, id) = self.inner.parts();
        if let WorkingCopy::Object(entries) = draft.copy_mut(id) {
            entries.insert(key.clone(), Slot::Value(value));
        }
        draft.assign(id, Value::from(key), true);
        draft.mark_changed(id);
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let (draft, id) = self.inner.parts();
        let in_original = draft.original(id).get(key).is_some();
        let removed = match draft.copy_mut(id) {
            WorkingCopy::Object(entries) => entries.shift_remove(key).is_some(),
            _ => false,
        };
        let ledger_key = Value::from(key);
        if in_original {
            draft.assign(id, ledger_key, false);
        } else {
            draft.unassign(id, &ledger_key);
        }
        if removed {
            draft.record(id, Operation::Delete, Some(PathStep::from(key)), Vec::new());
            draft.mark_changed(id);
        }
        removed
    }
}
