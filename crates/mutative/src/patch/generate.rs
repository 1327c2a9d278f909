//! Patch generation from the assigned ledger.
//!
//! Each container kind has its own rule:
//!
//! - objects: one patch per ledger entry, `remove` for deletions, `add` for
//!   keys missing from the original, `replace` otherwise, with deeply equal
//!   replacements dropped;
//! - arrays: `replace` per assigned index whose value changed, `add` for the
//!   tail and a `"length"` `replace` to undo growth;
//! - maps and sets: positional patches that turn the original order into the
//!   final one: removals first, then additions at their final positions,
//!   then value replacements.
//!
//! Every emitted value is a deep clone, so patches never alias the states
//! they were produced from.

use std::collections::HashMap;

use mutative_json_pointer::PathStep;
use mutative_util::{deep_clone, deep_equal, Value};

use super::types::{join, Patch};
use crate::draft::{array_index_key, ProxyDraft, LENGTH};
use crate::types::DraftType;

/// Emits patches for `draft` once.
///
/// Runs only when the draft was operated, has ledger entries and was not
/// finalized before; it then sets `finalized`. With no sink the draft is
/// still marked finalized.
pub fn finalize_patches(
    draft: &mut ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    sink: Option<(&mut Vec<Patch>, &mut Vec<Patch>)>,
) {
    let should_finalize = draft.operated && !draft.assigned.is_empty() && !draft.finalized;
    if !should_finalize {
        return;
    }
    if let Some((patches, inverse_patches)) = sink {
        generate_patches(draft, current, base_path, patches, inverse_patches);
    }
    draft.finalized = true;
}

/// Appends the forward and inverse patches turning `draft.original` into
/// `current` at `base_path`.
pub fn generate_patches(
    draft: &ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    patches: &mut Vec<Patch>,
    inverse_patches: &mut Vec<Patch>,
) {
    match draft.kind {
        DraftType::Object => generate_object_patches(draft, current, base_path, patches, inverse_patches),
        DraftType::Array => generate_array_patches(draft, current, base_path, patches, inverse_patches),
        DraftType::Map => generate_map_patches(draft, current, base_path, patches, inverse_patches),
        DraftType::Set => generate_set_patches(draft, current, base_path, patches, inverse_patches),
    }
}

fn generate_object_patches(
    draft: &ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    patches: &mut Vec<Patch>,
    inverse_patches: &mut Vec<Patch>,
) {
    let (Some(original), Some(copy)) = (draft.original.as_object(), current.as_object()) else {
        return;
    };
    for (key, &assigned) in &draft.assigned {
        let Some(key) = key.as_str() else {
            continue;
        };
        let path = join(base_path, key);
        let original_value = original.get(key);
        if !assigned {
            let removed = original_value.map(deep_clone).unwrap_or_default();
            patches.push(Patch::remove(path.clone()));
            inverse_patches.push(Patch::add(path, removed));
            continue;
        }
        let Some(value) = copy.get(key) else {
            continue;
        };
        match original_value {
            None => {
                patches.push(Patch::add(path.clone(), deep_clone(value)));
                inverse_patches.push(Patch::remove(path));
            }
            Some(original_value) if deep_equal(original_value, value) => {}
            Some(original_value) => {
                patches.push(Patch::replace(path.clone(), deep_clone(value)));
                inverse_patches.push(Patch::replace(path, deep_clone(original_value)));
            }
        }
    }
}

fn generate_array_patches(
    draft: &ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    patches: &mut Vec<Patch>,
    inverse_patches: &mut Vec<Patch>,
) {
    let (Some(mut original), Some(mut copy)) = (draft.original.as_array(), current.as_array()) else {
        return;
    };
    let mut patches: &mut Vec<Patch> = patches;
    let mut inverse_patches: &mut Vec<Patch> = inverse_patches;
    // Shrinking is growing in reverse: swap roles so the loop below only
    // ever handles the growing direction.
    if copy.len() < original.len() {
        std::mem::swap(&mut original, &mut copy);
        std::mem::swap(&mut patches, &mut inverse_patches);
    }
    for index in 0..original.len() {
        let assigned = draft.assigned.get(&array_index_key(index)) == Some(&true);
        if assigned && !deep_equal(&copy[index], &original[index]) {
            let path = join(base_path, index);
            patches.push(Patch::replace(path.clone(), deep_clone(&copy[index])));
            inverse_patches.push(Patch::replace(path, deep_clone(&original[index])));
        }
    }
    for (index, value) in copy.iter().enumerate().skip(original.len()) {
        patches.push(Patch::add(join(base_path, index), deep_clone(value)));
    }
    if original.len() < copy.len() {
        inverse_patches.push(Patch::replace(join(base_path, LENGTH), Value::from(original.len())));
    }
}

fn generate_map_patches(
    draft: &ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    patches: &mut Vec<Patch>,
    inverse_patches: &mut Vec<Patch>,
) {
    let (Some(original), Some(copy)) = (draft.original.as_map(), current.as_map()) else {
        return;
    };
    let final_index: Vec<Option<usize>> = original.keys().map(|k| copy.get_index_of(k)).collect();
    let untouched: Vec<bool> = original.keys().map(|k| !draft.assigned.contains_key(k)).collect();
    let kept = kept_in_order(&final_index, &untouched);

    let mut chunk = PositionalChunk::new(base_path);
    let mut live = 0;
    for ((key, value), &stays) in original.iter().zip(&kept) {
        if stays {
            live += 1;
        } else {
            chunk.remove(live, pair(key, value));
        }
    }
    let stays_at = final_positions(&final_index, &kept, copy.len());
    for (position, (key, value)) in copy.iter().enumerate() {
        if !stays_at[position] {
            chunk.add(position, pair(key, value));
        }
    }
    for (position, (key, value)) in copy.iter().enumerate() {
        if !stays_at[position] || draft.assigned.get(key) != Some(&true) {
            continue;
        }
        match original.get(key) {
            Some(original_value) if !deep_equal(original_value, value) => {
                chunk.replace(position, deep_clone(value), deep_clone(original_value));
            }
            _ => {}
        }
    }
    chunk.finish(patches, inverse_patches);
}

fn generate_set_patches(
    draft: &ProxyDraft,
    current: &Value,
    base_path: &[PathStep],
    patches: &mut Vec<Patch>,
    inverse_patches: &mut Vec<Patch>,
) {
    let (Some(original), Some(copy)) = (draft.original.as_set(), current.as_set()) else {
        return;
    };
    // Drafted members are matched through the member they were drafted from.
    let origins: Vec<&Value> = if draft.origins.len() == copy.len() {
        draft.origins.iter().collect()
    } else {
        copy.iter().collect()
    };
    let mut origin_index: HashMap<&Value, usize> = HashMap::with_capacity(origins.len());
    for (position, origin) in origins.iter().enumerate() {
        origin_index.entry(*origin).or_insert(position);
    }
    // A member the ledger marks as added is always re-inserted.
    let final_index: Vec<Option<usize>> = original
        .iter()
        .map(|member| match draft.assigned.get(member) {
            Some(true) => None,
            _ => origin_index.get(member).copied(),
        })
        .collect();
    let kept = kept_in_order(&final_index, &vec![true; original.len()]);

    let mut chunk = PositionalChunk::new(base_path);
    let mut live = 0;
    for (member, &stays) in original.iter().zip(&kept) {
        if stays {
            live += 1;
        } else {
            chunk.remove(live, deep_clone(member));
        }
    }
    let stays_at = final_positions(&final_index, &kept, copy.len());
    for (position, member) in copy.iter().enumerate() {
        if !stays_at[position] {
            chunk.add(position, deep_clone(member));
        }
    }
    chunk.finish(patches, inverse_patches);
}

/// Picks the original entries that stay in place: still present, in
/// increasing final position. Untouched entries never move relative to each
/// other; a touched entry stays only if it fits before the next untouched one.
fn kept_in_order(final_index: &[Option<usize>], untouched: &[bool]) -> Vec<bool> {
    let mut bound = vec![usize::MAX; final_index.len()];
    let mut next = usize::MAX;
    for i in (0..final_index.len()).rev() {
        bound[i] = next;
        if let (true, Some(position)) = (untouched[i], final_index[i]) {
            next = position;
        }
    }
    let mut last: Option<usize> = None;
    final_index
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let Some(position) = *position else {
                return false;
            };
            let fits = last.map_or(true, |l| position > l) && (untouched[i] || position < bound[i]);
            if fits {
                last = Some(position);
            }
            fits
        })
        .collect()
}

fn final_positions(final_index: &[Option<usize>], kept: &[bool], len: usize) -> Vec<bool> {
    let mut stays = vec![false; len];
    for (position, &stays_here) in final_index.iter().zip(kept) {
        if let (true, Some(position)) = (stays_here, position) {
            stays[*position] = true;
        }
    }
    stays
}

/// Positional patches for a map or set. Forward patches are applied in
/// order and end on the final order; the inverse undoes them back to front.
struct PositionalChunk<'a> {
    base_path: &'a [PathStep],
    forward: Vec<Patch>,
    reverted: Vec<Patch>,
}

impl<'a> PositionalChunk<'a> {
    fn new(base_path: &'a [PathStep]) -> Self {
        Self {
            base_path,
            forward: Vec::new(),
            reverted: Vec::new(),
        }
    }

    fn remove(&mut self, position: usize, restored: Value) {
        let path = join(self.base_path, position);
        self.forward.push(Patch::remove(path.clone()));
        self.reverted.push(Patch::add(path, restored));
    }

    fn add(&mut self, position: usize, value: Value) {
        let path = join(self.base_path, position);
        self.forward.push(Patch::add(path.clone(), value));
        self.reverted.push(Patch::remove(path));
    }

    fn replace(&mut self, position: usize, value: Value, original: Value) {
        let path = join(self.base_path, position);
        self.forward.push(Patch::replace(path.clone(), value));
        self.reverted.push(Patch::replace(path, original));
    }

    fn finish(self, patches: &mut Vec<Patch>, inverse_patches: &mut Vec<Patch>) {
        patches.extend(self.forward);
        inverse_patches.extend(self.reverted.into_iter().rev());
    }
}

fn pair(key: &Value, value: &Value) -> Value {
    Value::array([deep_clone(key), deep_clone(value)])
}
