use mutative_json_pointer::PathStep;
use mutative_util::Value;

use super::handle::typed_handle;
use super::{Draft, DraftId, DraftRef, Slot, WorkingCopy};
use crate::record::{Arg, Operation};

/// Write handle for a set draft.
///
/// Members are compared by their current value. Positions follow
/// insertion order.
#[derive(Debug)]
pub struct SetDraft<'a> {
    pub(crate) inner: DraftRef<'a>,
}

typed_handle!(SetDraft);

impl Draft {
    fn set_slots(&mut self, id: DraftId) -> Option<&mut Vec<Slot>> {
        match self.copy_mut(id) {
            WorkingCopy::Set(slots) => Some(slots),
            _ => None,
        }
    }

    fn set_members(&self, id: DraftId) -> Vec<Value> {
        match self.copy_ref(id) {
            Some(WorkingCopy::Set(slots)) => slots.iter().map(|s| self.slot_value(s)).collect(),
            _ => self
                .original(id)
                .as_set()
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    fn set_position(&self, id: DraftId, member: &Value) -> Option<usize> {
        self.set_members(id).iter().position(|m| m == member)
    }

    /// The value a member slot is tracked under in the ledger: the original
    /// member for drafted members.
    pub(super) fn set_ledger_key(&self, slot: &Slot) -> Value {
        match slot {
            Slot::Draft(child) => self.drafts[*child].original.clone(),
            Slot::Value(value) => value.clone(),
        }
    }

    fn set_forget(&mut self, id: DraftId, ledger_key: &Value) {
        let in_original = self.original(id).as_set().is_some_and(|s| s.contains(ledger_key));
        if in_original {
            self.assign(id, ledger_key.clone(), false);
        } else {
            self.unassign(id, ledger_key);
        }
    }
}

impl<'a> SetDraft<'a> {
    pub fn contains(&self, member: &Value) -> bool {
        self.draft.set_position(self.id, member).is_some()
    }

    pub fn values(&self) -> Vec<Value> {
        self.draft.set_members(self.id)
    }

    pub fn position(&self, member: &Value) -> Option<usize> {
        self.draft.set_position(self.id, member)
    }

    pub fn child_at(&mut self, position: usize) -> Option<DraftRef<'_>> {
        self.inner.child(position)
    }

    /// Appends `member` unless it is already present.
    pub fn add(&mut self, member: Value) -> bool {
        let position = self.len();
        self.add_at(position, member)
    }

    /// Inserts `member` at `position` unless it is already present. Past the
    /// end it is appended.
    pub fn add_at(&mut self, position: usize, member: Value) -> bool {
        if self.contains(&member) {
            return false;
        }
        let (draft, id) = self.inner.parts();
        let position = position.min(draft.len_of(id));
        draft.record(
            id,
            Operation::Add,
            Some(PathStep::Index(position)),
            vec![Arg::Literal(member.clone())],
        );
        if let Some(slots) = draft.set_slots(id) {
            slots.insert(position, Slot::Value(member.clone()));
        }
        draft.assign(id, member, true);
        draft.mark_changed(id);
        true
    }

    /// Removes `member`. Returns whether it was present.
    pub fn delete(&mut self, member: &Value) -> bool {
        match self.position(member) {
            Some(position) => self.delete_at(position),
            None => false,
        }
    }

    pub fn delete_at(&mut self, position: usize) -> bool {
        let (draft, id) = self.inner.parts();
        if position >= draft.len_of(id) {
            return false;
        }
        draft.record(id, Operation::Delete, Some(PathStep::Index(position)), Vec::new());
        let Some(slot) = draft.set_slots(id).map(|slots| slots.remove(position)) else {
            return false;
        };
        let ledger_key = draft.set_ledger_key(&slot);
        draft.set_forget(id, &ledger_key);
        draft.mark_changed(id);
        true
    }

    /// Swaps the member at `position` for `member`.
    pub fn replace_at(&mut self, position: usize, member: Value) -> bool {
        if !self.delete_at(position) {
            return false;
        }
        self.add_at(position, member);
        true
    }

    pub fn clear(&mut self) {
        let (draft, id) = self.inner.parts();
        if draft.len_of(id) == 0 {
            return;
        }
        draft.record_whole(id, Operation::Clear, Vec::new());
        self.clear_members();
    }

    fn clear_members(&mut self) {
        let (draft, id) = self.inner.parts();
        let removed: Vec<Slot> = draft.set_slots(id).map(std::mem::take).unwrap_or_default();
        for slot in &removed {
            let ledger_key = draft.set_ledger_key(slot);
            draft.set_forget(id, &ledger_key);
        }
        if !removed.is_empty() {
            draft.mark_changed(id);
        }
    }

    /// Replaces the whole content with `members`, dropping duplicates.
    pub fn construct(&mut self, members: Vec<Value>) {
        let (draft, id) = self.inner.parts();
        if draft.is_recording() {
            let args = members.iter().cloned().map(Arg::Literal).collect();
            draft.record_whole(id, Operation::Construct, args);
        }
        self.clear_members();
        let (draft, id) = self.inner.parts();
        for member in members {
            let slots = draft.set_slots(id);
            if let Some(slots) = slots {
                if slots.iter().any(|s| matches!(s, Slot::Value(v) if *v == member)) {
                    continue;
                }
                slots.push(Slot::Value(member.clone()));
            }
            draft.assign(id, member, true);
        }
        draft.mark_changed(id);
    }
}
