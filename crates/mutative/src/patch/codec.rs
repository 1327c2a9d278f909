//! JSON codec for patches.
//!
//! A patch is `{"op": "add" | "replace" | "remove", "path": [...], "value": ...}`
//! where path steps are numbers (indices and positions) or strings (keys).
//! Values go through [`mutative_util::to_json`], so maps and sets keep their
//! tagged form. A JSON Pointer string is accepted as a path on decode; all of
//! its steps are keys.

use mutative_json_pointer::{try_parse_json_pointer, Path, PathStep};
use serde_json::{Map, Value as Json};

use super::types::{Patch, PatchError, PatchOp};

// ── Path helpers ──────────────────────────────────────────────────────────

pub fn encode_path(path: &[PathStep]) -> Json {
    Json::Array(
        path.iter()
            .map(|step| match step {
                PathStep::Index(i) => Json::from(*i),
                PathStep::Key(k) => Json::String(k.clone()),
            })
            .collect(),
    )
}

pub fn decode_path(json: &Json) -> Result<Path, PatchError> {
    match json {
        Json::Array(steps) => steps.iter().map(decode_step).collect(),
        Json::String(pointer) => {
            try_parse_json_pointer(pointer).map_err(|e| PatchError::InvalidPath(e.to_string()))
        }
        _ => Err(PatchError::InvalidPath("path must be an array".into())),
    }
}

fn decode_step(json: &Json) -> Result<PathStep, PatchError> {
    match json {
        Json::String(key) => Ok(PathStep::Key(key.clone())),
        Json::Number(n) => n
            .as_u64()
            .map(|i| PathStep::Index(i as usize))
            .ok_or_else(|| PatchError::InvalidPath(format!("invalid index: {n}"))),
        other => Err(PatchError::InvalidPath(format!("invalid step: {other}"))),
    }
}

// ── Serialization ─────────────────────────────────────────────────────────

pub fn to_json(patch: &Patch) -> Json {
    let mut obj = Map::new();
    obj.insert("op".into(), Json::String(patch.op.as_str().into()));
    obj.insert("path".into(), encode_path(&patch.path));
    if let Some(value) = &patch.value {
        obj.insert("value".into(), mutative_util::to_json(value));
    }
    Json::Object(obj)
}

pub fn to_json_patch(patches: &[Patch]) -> Json {
    Json::Array(patches.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

pub fn from_json(json: &Json) -> Result<Patch, PatchError> {
    let obj = json
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an object".into()))?;
    let op = obj
        .get("op")
        .and_then(Json::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing op".into()))?;
    let op = PatchOp::from_str(op)?;
    let path = decode_path(
        obj.get("path")
            .ok_or_else(|| PatchError::InvalidPath("missing path".into()))?,
    )?;
    let value = obj.get("value").map(mutative_util::from_json);
    if op != PatchOp::Remove && value.is_none() {
        return Err(PatchError::MissingValue);
    }
    Ok(Patch {
        op,
        path,
        value: if op == PatchOp::Remove { None } else { value },
    })
}

pub fn from_json_patch(json: &Json) -> Result<Vec<Patch>, PatchError> {
    json.as_array()
        .ok_or_else(|| PatchError::InvalidOp("patches must be an array".into()))?
        .iter()
        .map(from_json)
        .collect()
}
