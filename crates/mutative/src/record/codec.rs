//! JSON codec for recorded entries.
//!
//! An entry is a three element array `[[type, op], paths, args]`:
//!
//! - `type` is the container tag: `0` object, `1` array, `2` map, `3` set;
//! - `op` is the lowercase operation name;
//! - `paths` is an array of step arrays (numbers for indices and positions,
//!   strings for keys);
//! - `args` holds literal values, or `{"$path": [...]}` for an argument
//!   resolved from the draft at replay time.

use serde_json::{json, Map, Value as Json};

use super::types::{Arg, Operation, RecordedEntry};
use crate::patch::codec::{decode_path, encode_path};
use crate::patch::PatchError;
use crate::types::DraftType;

pub const PATH_TAG: &str = "$path";

// ── Serialization ─────────────────────────────────────────────────────────

fn encode_arg(arg: &Arg) -> Json {
    match arg {
        Arg::Literal(value) => mutative_util::to_json(value),
        Arg::Path(path) => {
            let mut obj = Map::new();
            obj.insert(PATH_TAG.into(), encode_path(path));
            Json::Object(obj)
        }
    }
}

pub fn to_json(entry: &RecordedEntry) -> Json {
    json!([
        [entry.target.tag(), entry.operation.as_str()],
        entry.paths.iter().map(|p| encode_path(p)).collect::<Vec<_>>(),
        entry.args.iter().map(encode_arg).collect::<Vec<_>>(),
    ])
}

pub fn to_json_log(entries: &[RecordedEntry]) -> Json {
    Json::Array(entries.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

fn invalid(msg: &str) -> PatchError {
    PatchError::InvalidOp(msg.to_string())
}

fn decode_arg(json: &Json) -> Result<Arg, PatchError> {
    if let Some(obj) = json.as_object() {
        if obj.len() == 1 {
            if let Some(path) = obj.get(PATH_TAG) {
                return decode_path(path).map(Arg::Path);
            }
        }
    }
    Ok(Arg::Literal(mutative_util::from_json(json)))
}

pub fn from_json(json: &Json) -> Result<RecordedEntry, PatchError> {
    let parts = json
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| invalid("entry must be [[type, op], paths, args]"))?;
    let head = parts[0]
        .as_array()
        .filter(|h| h.len() == 2)
        .ok_or_else(|| invalid("entry head must be [type, op]"))?;
    let target = head[0]
        .as_u64()
        .and_then(DraftType::from_tag)
        .ok_or_else(|| invalid("unknown draft type"))?;
    let op_name = head[1].as_str().ok_or_else(|| invalid("op must be a string"))?;
    let operation =
        Operation::parse(op_name).ok_or_else(|| PatchError::InvalidOp(format!("unknown op: {op_name}")))?;
    if !operation.applies_to(target) {
        return Err(PatchError::InvalidOp(format!(
            "{op_name} is not a {target} operation"
        )));
    }
    let paths = parts[1]
        .as_array()
        .ok_or_else(|| PatchError::InvalidPath("paths must be an array".into()))?
        .iter()
        .map(decode_path)
        .collect::<Result<Vec<_>, _>>()?;
    let args = parts[2]
        .as_array()
        .ok_or_else(|| invalid("args must be an array"))?
        .iter()
        .map(decode_arg)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RecordedEntry {
        target,
        operation,
        paths,
        args,
    })
}

pub fn from_json_log(json: &Json) -> Result<Vec<RecordedEntry>, PatchError> {
    json.as_array()
        .ok_or_else(|| invalid("log must be an array"))?
        .iter()
        .map(from_json)
        .collect()
}
