//! Draft engine.
//!
//! A [`Draft`] is a mutable session over an immutable base value. Every
//! container reached through the session gets its own [`ProxyDraft`] node in
//! an arena; the node keeps the original value, a lazily created shallow
//! working copy, and the assigned ledger that the patch generator reads.
//!
//! Writes go through typed handles ([`ObjectDraft`], [`ArrayDraft`],
//! [`MapDraft`], [`SetDraft`]). Each write updates the ledger, marks the
//! draft and its ancestors operated, and, when recording is on, appends a
//! [`RecordedEntry`].
//!
//! Finalizing walks the arena depth-first: untouched drafts hand back their
//! original (shared) value, operated ones materialize a fresh container and
//! emit their patch chunks.

mod array;
mod handle;
mod map;
mod object;
mod set;

pub(crate) use array::{index_key as array_index_key, LENGTH};
pub use array::ArrayDraft;
pub use handle::DraftRef;
pub use map::MapDraft;
pub use object::ObjectDraft;
pub use set::SetDraft;

use indexmap::IndexMap;
use mutative_json_pointer::{format_json_pointer, Path, PathStep};
use mutative_util::Value;
use tracing::{debug, trace};

use crate::freeze::freeze;
use crate::patch::{finalize_patches, Patch};
use crate::record::{Arg, Operation, RecordedEntry};
use crate::types::{DraftType, MutativeError, Options};

pub type DraftId = usize;

/// Per-draft record of which keys were written (`true`) or deleted
/// (`false`), in first-touch order.
///
/// Keys are `Value::String` for object keys and array indices (the index in
/// decimal) plus `"length"` for arrays, the key itself for maps and the
/// member itself for sets.
pub type AssignedMap = IndexMap<Value, bool>;

const ROOT: DraftId = 0;

/// Slot of a working copy: either a plain value or a child draft.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Value(Value),
    Draft(DraftId),
}

/// Shallow mutable copy of a container.
#[derive(Debug, Clone)]
pub(crate) enum WorkingCopy {
    Object(IndexMap<String, Slot>),
    Array(Vec<Slot>),
    Map(IndexMap<Value, Slot>),
    Set(Vec<Slot>),
}

#[derive(Debug)]
pub struct ProxyDraft {
    pub kind: DraftType,
    pub original: Value,
    pub(crate) copy: Option<WorkingCopy>,
    pub assigned: AssignedMap,
    /// Set when this draft or any descendant was written.
    pub operated: bool,
    /// Set once patches were emitted for this draft.
    pub finalized: bool,
    pub(crate) parent: Option<DraftId>,
    /// Sets only: the ledger key behind each final slot, filled in by
    /// finalize.
    pub(crate) origins: Vec<Value>,
}

impl ProxyDraft {
    pub fn new(original: Value) -> Result<Self, MutativeError> {
        let kind =
            DraftType::of(&original).ok_or(MutativeError::NotDraftable(original.kind().as_str()))?;
        Ok(Self {
            kind,
            original,
            copy: None,
            assigned: AssignedMap::new(),
            operated: false,
            finalized: false,
            parent: None,
            origins: Vec::new(),
        })
    }

    pub fn has_copy(&self) -> bool {
        self.copy.is_some()
    }
}

fn shallow_copy(original: &Value) -> WorkingCopy {
    match original {
        Value::Object(o) => WorkingCopy::Object(
            o.iter()
                .map(|(k, v)| (k.clone(), Slot::Value(v.clone())))
                .collect(),
        ),
        Value::Array(a) => WorkingCopy::Array(a.iter().cloned().map(Slot::Value).collect()),
        Value::Map(m) => WorkingCopy::Map(
            m.iter()
                .map(|(k, v)| (k.clone(), Slot::Value(v.clone())))
                .collect(),
        ),
        Value::Set(s) => WorkingCopy::Set(s.iter().cloned().map(Slot::Value).collect()),
        // Scalars never become drafts, see `ProxyDraft::new`.
        _ => WorkingCopy::Object(IndexMap::new()),
    }
}

/// Result of [`create`].
#[derive(Debug, Clone)]
pub struct Produced {
    pub state: Value,
    /// Forward patches, empty unless `enable_patches` was set.
    pub patches: Vec<Patch>,
    /// Patches turning `state` back into the base.
    pub inverse_patches: Vec<Patch>,
    /// Recorded entries, empty unless `record` was set.
    pub recorded: Vec<RecordedEntry>,
}

/// Runs `recipe` against a draft of `base` and finalizes it.
///
/// `base` must be a container. An error returned by the recipe aborts the
/// session and is passed through.
///
/// ```
/// use mutative::{create, Options};
/// use mutative_util::Value;
///
/// let base = Value::array([Value::from(1), Value::from(2)]);
/// let produced = create(
///     &base,
///     |draft| {
///         draft.root().array()?.push(vec![Value::from(3)]);
///         Ok(())
///     },
///     &Options::with_patches(),
/// )
/// .unwrap();
/// assert_eq!(produced.state.len(), 3);
/// assert_eq!(produced.patches.len(), 1);
/// assert_eq!(base.len(), 2);
/// ```
pub fn create<F>(base: &Value, recipe: F, options: &Options) -> Result<Produced, MutativeError>
where
    F: FnOnce(&mut Draft) -> Result<(), MutativeError>,
{
    let mut draft = Draft::new(base, options.record)?;
    recipe(&mut draft)?;
    Ok(draft.finalize(options))
}

/// [`create`] with default options, returning only the new state.
pub fn produce<F>(base: &Value, recipe: F) -> Result<Value, MutativeError>
where
    F: FnOnce(&mut Draft) -> Result<(), MutativeError>,
{
    create(base, recipe, &Options::default()).map(|produced| produced.state)
}

// ── Session ───────────────────────────────────────────────────────────────

/// A draft session. Draft id `0` is the root.
#[derive(Debug)]
pub struct Draft {
    pub(crate) drafts: Vec<ProxyDraft>,
    recorded: Option<Vec<RecordedEntry>>,
}

impl Draft {
    pub(crate) fn new(base: &Value, record: bool) -> Result<Self, MutativeError> {
        let root = ProxyDraft::new(base.clone())?;
        trace!(kind = %root.kind, "draft session opened");
        Ok(Self {
            drafts: vec![root],
            recorded: record.then(Vec::new),
        })
    }

    pub fn root(&mut self) -> DraftRef<'_> {
        DraftRef::new(self, ROOT)
    }

    /// Resolves a positional path from the root, drafting every container
    /// on the way. `None` if a step is missing or lands on a scalar.
    pub fn at(&mut self, path: &[PathStep]) -> Option<DraftRef<'_>> {
        let mut id = ROOT;
        for step in path {
            id = self.child_id(id, step)?;
        }
        Some(DraftRef::new(self, id))
    }

    /// Current value at a positional path, without creating drafts.
    pub fn value_at(&self, path: &[PathStep]) -> Option<Value> {
        let mut cursor = Slot::Draft(ROOT);
        for step in path {
            cursor = match cursor {
                Slot::Draft(id) => self.slot_at(id, step)?,
                Slot::Value(value) => Slot::Value(value_step(&value, step)?.clone()),
            };
        }
        Some(self.slot_value(&cursor))
    }

    /// The current state of the whole session.
    pub fn current(&self) -> Value {
        self.current_of(ROOT)
    }

    pub fn proxy(&self, id: DraftId) -> Option<&ProxyDraft> {
        self.drafts.get(id)
    }

    // ── Arena internals ───────────────────────────────────────────────────

    pub(crate) fn original(&self, id: DraftId) -> &Value {
        &self.drafts[id].original
    }

    pub(crate) fn copy_mut(&mut self, id: DraftId) -> &mut WorkingCopy {
        let ProxyDraft { original, copy, .. } = &mut self.drafts[id];
        copy.get_or_insert_with(|| shallow_copy(original))
    }

    pub(crate) fn copy_ref(&self, id: DraftId) -> Option<&WorkingCopy> {
        self.drafts[id].copy.as_ref()
    }

    pub(crate) fn assign(&mut self, id: DraftId, key: Value, assigned: bool) {
        self.drafts[id].assigned.insert(key, assigned);
    }

    pub(crate) fn unassign(&mut self, id: DraftId, key: &Value) {
        self.drafts[id].assigned.shift_remove(key);
    }

    /// Marks the draft and all its ancestors operated.
    pub(crate) fn mark_changed(&mut self, id: DraftId) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let draft = &mut self.drafts[current];
            if draft.operated {
                break;
            }
            draft.operated = true;
            cursor = draft.parent;
        }
    }

    fn spawn(&mut self, original: Value, parent: DraftId) -> Option<DraftId> {
        let mut draft = ProxyDraft::new(original).ok()?;
        draft.parent = Some(parent);
        let id = self.drafts.len();
        trace!(id, parent, kind = %draft.kind, "child draft created");
        self.drafts.push(draft);
        Some(id)
    }

    /// Child draft at a positional step, created on first access.
    pub(crate) fn child_id(&mut self, id: DraftId, step: &PathStep) -> Option<DraftId> {
        let slot = self.slot_mut(id, step)?;
        let value = match slot {
            Slot::Draft(child) => return Some(*child),
            Slot::Value(value) if value.is_container() => value.clone(),
            Slot::Value(_) => return None,
        };
        let child = self.spawn(value, id)?;
        if let Some(slot) = self.slot_mut(id, step) {
            *slot = Slot::Draft(child);
        }
        Some(child)
    }

    fn slot_mut(&mut self, id: DraftId, step: &PathStep) -> Option<&mut Slot> {
        match self.copy_mut(id) {
            WorkingCopy::Object(entries) => entries.get_mut(step.to_key().as_str()),
            WorkingCopy::Array(slots) => slots.get_mut(step.as_index()?),
            WorkingCopy::Map(entries) => entries.get_index_mut(step.as_index()?).map(|(_, s)| s),
            WorkingCopy::Set(slots) => slots.get_mut(step.as_index()?),
        }
    }

    fn slot_at(&self, id: DraftId, step: &PathStep) -> Option<Slot> {
        let Some(copy) = self.copy_ref(id) else {
            return value_step(self.original(id), step).cloned().map(Slot::Value);
        };
        match copy {
            WorkingCopy::Object(entries) => entries.get(step.to_key().as_str()).cloned(),
            WorkingCopy::Array(slots) => slots.get(step.as_index()?).cloned(),
            WorkingCopy::Map(entries) => entries.get_index(step.as_index()?).map(|(_, s)| s.clone()),
            WorkingCopy::Set(slots) => slots.get(step.as_index()?).cloned(),
        }
    }

    pub(crate) fn slot_value(&self, slot: &Slot) -> Value {
        match slot {
            Slot::Value(value) => value.clone(),
            Slot::Draft(id) => self.current_of(*id),
        }
    }

    pub(crate) fn current_of(&self, id: DraftId) -> Value {
        let draft = &self.drafts[id];
        match &draft.copy {
            Some(copy) if draft.operated => self.build(copy, |slot| self.slot_value(slot)),
            _ => draft.original.clone(),
        }
    }

    fn build(&self, copy: &WorkingCopy, mut value_of: impl FnMut(&Slot) -> Value) -> Value {
        match copy {
            WorkingCopy::Object(entries) => {
                Value::object(entries.iter().map(|(k, s)| (k.clone(), value_of(s))))
            }
            WorkingCopy::Array(slots) => Value::array(slots.iter().map(value_of)),
            WorkingCopy::Map(entries) => {
                Value::map(entries.iter().map(|(k, s)| (k.clone(), value_of(s))))
            }
            WorkingCopy::Set(slots) => Value::set(slots.iter().map(value_of)),
        }
    }

    pub(crate) fn len_of(&self, id: DraftId) -> usize {
        match self.copy_ref(id) {
            Some(WorkingCopy::Object(entries)) => entries.len(),
            Some(WorkingCopy::Array(slots)) | Some(WorkingCopy::Set(slots)) => slots.len(),
            Some(WorkingCopy::Map(entries)) => entries.len(),
            None => self.original(id).len(),
        }
    }

    /// Positional path of a draft, computed from the current copies.
    pub(crate) fn path_of(&self, id: DraftId) -> Path {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.drafts[current].parent {
            if let Some(step) = self.step_of(parent, current) {
                path.push(step);
            }
            current = parent;
        }
        path.reverse();
        path
    }

    fn step_of(&self, parent: DraftId, child: DraftId) -> Option<PathStep> {
        let is_child = |slot: &Slot| matches!(slot, Slot::Draft(c) if *c == child);
        match self.copy_ref(parent)? {
            WorkingCopy::Object(entries) => entries
                .iter()
                .find(|(_, s)| is_child(*s))
                .map(|(k, _)| PathStep::Key(k.clone())),
            WorkingCopy::Array(slots) | WorkingCopy::Set(slots) => {
                slots.iter().position(is_child).map(PathStep::Index)
            }
            WorkingCopy::Map(entries) => entries.values().position(is_child).map(PathStep::Index),
        }
    }

    /// Appends a recorded entry for a write on draft `id`. `step` addresses
    /// the member; whole-container operations pass `None`.
    pub(crate) fn record(
        &mut self,
        id: DraftId,
        operation: Operation,
        step: Option<PathStep>,
        args: Vec<Arg>,
    ) {
        if self.recorded.is_none() {
            return;
        }
        let target = self.drafts[id].kind;
        let mut path = self.path_of(id);
        path.extend(step);
        if let Some(entries) = self.recorded.as_mut() {
            entries.push(RecordedEntry::new(target, operation, path, args));
        }
    }

    /// Records a map or set `clear`/`construct`. The path gets a trailing
    /// placeholder step, so it resolves like a member operation.
    pub(crate) fn record_whole(&mut self, id: DraftId, operation: Operation, args: Vec<Arg>) {
        self.record(id, operation, Some(PathStep::Index(0)), args);
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recorded.is_some()
    }

    // ── Finalize ──────────────────────────────────────────────────────────

    fn finalize(mut self, options: &Options) -> Produced {
        let (state, patches, inverse_patches) =
            self.finalize_node(ROOT, Vec::new(), false, options.enable_patches);
        if options.enable_auto_freeze {
            freeze(&state);
        }
        debug!(
            patches = patches.len(),
            inverse_patches = inverse_patches.len(),
            drafts = self.drafts.len(),
            "draft finalized"
        );
        Produced {
            state,
            patches,
            inverse_patches,
            recorded: self.recorded.unwrap_or_default(),
        }
    }

    /// Materializes draft `id` and collects its patches.
    ///
    /// Forward patches come out in pre-order: this draft's chunk, then each
    /// child's in child order. Inverse patches are the children's chunks in
    /// reverse child order followed by this draft's chunk. A `covered` draft
    /// sits under an ancestor slot that is replaced wholesale and emits
    /// nothing.
    fn finalize_node(
        &mut self,
        id: DraftId,
        path: Path,
        covered: bool,
        enable_patches: bool,
    ) -> (Value, Vec<Patch>, Vec<Patch>) {
        if !self.drafts[id].operated {
            trace!(id, "untouched draft shares its base");
            return (self.drafts[id].original.clone(), Vec::new(), Vec::new());
        }
        let Some(copy) = self.drafts[id].copy.take() else {
            return (self.drafts[id].original.clone(), Vec::new(), Vec::new());
        };

        let mut children = ChildPatches {
            enable_patches,
            forward: Vec::new(),
            inverse: Vec::new(),
        };
        let current = match &copy {
            WorkingCopy::Object(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, slot) in entries {
                    let ledger_key = Value::from(key.as_str());
                    let step = PathStep::Key(key.clone());
                    let value =
                        self.finalize_slot(id, slot, step, &ledger_key, &path, covered, &mut children);
                    out.insert(key.clone(), value);
                }
                Value::object(out)
            }
            WorkingCopy::Array(slots) => {
                let mut out = Vec::with_capacity(slots.len());
                for (index, slot) in slots.iter().enumerate() {
                    let ledger_key = Value::from(index.to_string());
                    let step = PathStep::Index(index);
                    out.push(self.finalize_slot(id, slot, step, &ledger_key, &path, covered, &mut children));
                }
                Value::array(out)
            }
            WorkingCopy::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (position, (key, slot)) in entries.iter().enumerate() {
                    let step = PathStep::Index(position);
                    let value = self.finalize_slot(id, slot, step, key, &path, covered, &mut children);
                    out.push((key.clone(), value));
                }
                Value::map(out)
            }
            WorkingCopy::Set(slots) => {
                let mut out = Vec::with_capacity(slots.len());
                let mut origins = Vec::with_capacity(slots.len());
                for (position, slot) in slots.iter().enumerate() {
                    let ledger_key = self.set_ledger_key(slot);
                    let step = PathStep::Index(position);
                    let value =
                        self.finalize_slot(id, slot, step, &ledger_key, &path, covered, &mut children);
                    origins.push(ledger_key);
                    out.push(value);
                }
                self.drafts[id].origins = origins;
                Value::set(out)
            }
        };
        self.drafts[id].copy = Some(copy);

        let mut forward = Vec::new();
        let mut inverse = Vec::new();
        if !covered {
            let sink = if enable_patches {
                Some((&mut forward, &mut inverse))
            } else {
                None
            };
            finalize_patches(&mut self.drafts[id], &current, &path, sink);
        }
        if !forward.is_empty() {
            debug!(
                path = %format_json_pointer(&path),
                patches = forward.len(),
                "patches generated"
            );
        }

        forward.extend(children.forward);
        let mut all_inverse: Vec<Patch> = children.inverse.into_iter().rev().flatten().collect();
        all_inverse.extend(inverse);
        (current, forward, all_inverse)
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize_slot(
        &mut self,
        parent: DraftId,
        slot: &Slot,
        step: PathStep,
        ledger_key: &Value,
        path: &[PathStep],
        covered: bool,
        children: &mut ChildPatches,
    ) -> Value {
        match slot {
            Slot::Value(value) => value.clone(),
            Slot::Draft(child) => {
                let child_covered =
                    covered || self.drafts[parent].assigned.get(ledger_key) == Some(&true);
                let mut child_path = path.to_vec();
                child_path.push(step);
                let (value, forward, inverse) =
                    self.finalize_node(*child, child_path, child_covered, children.enable_patches);
                children.forward.extend(forward);
                children.inverse.push(inverse);
                value
            }
        }
    }
}

struct ChildPatches {
    enable_patches: bool,
    forward: Vec<Patch>,
    inverse: Vec<Vec<Patch>>,
}

/// Positional step into a plain value: object key, array index, map entry
/// position (yielding the value) or set member position.
pub fn value_step<'a>(value: &'a Value, step: &PathStep) -> Option<&'a Value> {
    match value {
        Value::Object(entries) => entries.get(step.to_key().as_str()),
        Value::Array(items) => items.get(step.as_index()?),
        Value::Map(entries) => entries.get_index(step.as_index()?).map(|(_, v)| v),
        Value::Set(members) => members.get_index(step.as_index()?),
        _ => None,
    }
}
