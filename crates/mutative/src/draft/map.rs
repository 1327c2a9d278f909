use indexmap::IndexMap;
use mutative_json_pointer::PathStep;
use mutative_util::Value;

use super::handle::typed_handle;
use super::{Draft, DraftId, DraftRef, Slot, WorkingCopy};
use crate::record::{Arg, Operation};

/// Write handle for a map draft.
///
/// Keys are addressed by value; the `*_at` methods address entries by
/// insertion position, which is how patches and recorded entries locate
/// them.
#[derive(Debug)]
pub struct MapDraft<'a> {
    pub(crate) inner: DraftRef<'a>,
}

typed_handle!(MapDraft);

impl Draft {
    fn map_entries(&mut self, id: DraftId) -> Option<&mut IndexMap<Value, Slot>> {
        match self.copy_mut(id) {
            WorkingCopy::Map(entries) => Some(entries),
            _ => None,
        }
    }

    fn map_position(&self, id: DraftId, key: &Value) -> Option<usize> {
        match self.copy_ref(id) {
            Some(WorkingCopy::Map(entries)) => entries.get_index_of(key),
            _ => self.original(id).as_map()?.get_index_of(key),
        }
    }

    fn map_key_at(&self, id: DraftId, position: usize) -> Option<Value> {
        match self.copy_ref(id) {
            Some(WorkingCopy::Map(entries)) => entries.get_index(position).map(|(k, _)| k.clone()),
            _ => self.original(id).as_map()?.get_index(position).map(|(k, _)| k.clone()),
        }
    }

    /// Ledger update for a key that left the map.
    fn map_forget(&mut self, id: DraftId, key: &Value) {
        let in_original = self.original(id).as_map().is_some_and(|m| m.contains_key(key));
        if in_original {
            self.assign(id, key.clone(), false);
        } else {
            self.unassign(id, key);
        }
    }
}

impl<'a> MapDraft<'a> {
    pub fn get(&self, key: &Value) -> Option<Value> {
        let position = self.draft.map_position(self.id, key)?;
        self.get_at(position)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.draft.map_position(self.id, key).is_some()
    }

    pub fn keys(&self) -> Vec<Value> {
        match self.draft.copy_ref(self.id) {
            Some(WorkingCopy::Map(entries)) => entries.keys().cloned().collect(),
            _ => self
                .original()
                .as_map()
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }

    pub fn key_at(&self, position: usize) -> Option<Value> {
        self.draft.map_key_at(self.id, position)
    }

    /// Child draft of the value stored under `key`.
    pub fn child(&mut self, key: &Value) -> Option<DraftRef<'_>> {
        let position = self.draft.map_position(self.id, key)?;
        self.inner.child(position)
    }

    pub fn child_at(&mut self, position: usize) -> Option<DraftRef<'_>> {
        self.inner.child(position)
    }

    /// Sets `key`. An existing key keeps its position, a new one is
    /// appended.
    pub fn set(&mut self, key: Value, value: Value) {
        let (draft, id) = self.inner.parts();
        if draft.is_recording() {
            let position = draft.map_position(id, &key).unwrap_or_else(|| draft.len_of(id));
            let args = vec![Arg::Literal(key.clone()), Arg::Literal(value.clone())];
            draft.record(id, Operation::Set, Some(PathStep::Index(position)), args);
        }
        self.write(key, value);
    }

    fn write(&mut self, key: Value, value: Value) {
        let (draft, id) = self.inner.parts();
        if let Some(entries) = draft.map_entries(id) {
            entries.insert(key.clone(), Slot::Value(value));
        }
        draft.assign(id, key, true);
        draft.mark_changed(id);
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&mut self, key: &Value) -> bool {
        let (draft, id) = self.inner.parts();
        let Some(position) = draft.map_position(id, key) else {
            return false;
        };
        draft.record(id, Operation::Delete, Some(PathStep::Index(position)), Vec::new());
        if let Some(entries) = draft.map_entries(id) {
            entries.shift_remove(key);
        }
        draft.map_forget(id, key);
        draft.mark_changed(id);
        true
    }

    pub fn clear(&mut self) {
        let (draft, id) = self.inner.parts();
        if draft.len_of(id) == 0 {
            return;
        }
        draft.record_whole(id, Operation::Clear, Vec::new());
        self.clear_entries();
    }

    fn clear_entries(&mut self) {
        let (draft, id) = self.inner.parts();
        let keys: Vec<Value> = match draft.map_entries(id) {
            Some(entries) => entries.drain(..).map(|(k, _)| k).collect(),
            None => Vec::new(),
        };
        for key in &keys {
            draft.map_forget(id, key);
        }
        if !keys.is_empty() {
            draft.mark_changed(id);
        }
    }

    /// Replaces the whole content with `entries`.
    pub fn construct(&mut self, entries: Vec<(Value, Value)>) {
        let (draft, id) = self.inner.parts();
        if draft.is_recording() {
            let args = entries
                .iter()
                .map(|(k, v)| Arg::Literal(Value::array([k.clone(), v.clone()])))
                .collect();
            draft.record_whole(id, Operation::Construct, args);
        }
        self.clear_entries();
        for (key, value) in entries {
            self.write(key, value);
        }
        let (draft, id) = self.inner.parts();
        draft.mark_changed(id);
    }

    /// Puts `key` at `position`, replacing the entry there. Past the end the
    /// pair is appended. An entry for `key` elsewhere is dropped.
    pub fn set_at(&mut self, position: usize, key: Value, value: Value) {
        let (draft, id) = self.inner.parts();
        if position >= draft.len_of(id) {
            self.set(key, value);
            return;
        }
        if draft.is_recording() {
            let args = vec![Arg::Literal(key.clone()), Arg::Literal(value.clone())];
            draft.record(id, Operation::Set, Some(PathStep::Index(position)), args);
        }
        let displaced = draft.map_key_at(id, position);
        if let Some(entries) = draft.map_entries(id) {
            let previous: Vec<(Value, Slot)> = entries.drain(..).collect();
            let mut value = Some(value);
            for (index, (k, slot)) in previous.into_iter().enumerate() {
                if index == position {
                    if let Some(value) = value.take() {
                        entries.insert(key.clone(), Slot::Value(value));
                    }
                } else if k != key {
                    entries.insert(k, slot);
                }
            }
        }
        if let Some(displaced) = displaced.filter(|d| *d != key) {
            draft.map_forget(id, &displaced);
        }
        draft.assign(id, key, true);
        draft.mark_changed(id);
    }

    /// Inserts a new `key` at `position`, shifting later entries. An existing
    /// key only has its value updated.
    pub fn insert_at(&mut self, position: usize, key: Value, value: Value) {
        let (draft, id) = self.inner.parts();
        if position >= draft.len_of(id) || draft.map_position(id, &key).is_some() {
            self.set(key, value);
            return;
        }
        if let Some(entries) = draft.map_entries(id) {
            entries.shift_insert(position, key.clone(), Slot::Value(value));
        }
        draft.assign(id, key, true);
        draft.mark_changed(id);
        if draft.is_recording() {
            let args = construct_args(draft, id);
            draft.record_whole(id, Operation::Construct, args);
        }
    }

    /// Sets the value of the entry at `position`.
    pub fn replace_at(&mut self, position: usize, value: Value) -> bool {
        let Some(key) = self.key_at(position) else {
            return false;
        };
        self.set(key, value);
        true
    }

    pub fn delete_at(&mut self, position: usize) -> bool {
        let Some(key) = self.key_at(position) else {
            return false;
        };
        self.delete(&key)
    }
}

/// Current entries as `[key, value]` construct arguments.
fn construct_args(draft: &Draft, id: DraftId) -> Vec<Arg> {
    match draft.copy_ref(id) {
        Some(WorkingCopy::Map(entries)) => entries
            .iter()
            .map(|(k, slot)| Arg::Literal(Value::array([k.clone(), draft.slot_value(slot)])))
            .collect(),
        _ => Vec::new(),
    }
}
