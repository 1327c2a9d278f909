//! Core types for the patch module.

use mutative_json_pointer::{Path, PathStep};
use mutative_util::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
    #[error("INVALID_PATH: {0}")]
    InvalidPath(String),
    #[error("MISSING_VALUE")]
    MissingValue,
}

// ── Operation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Replace => "replace",
            PatchOp::Remove => "remove",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, PatchError> {
        match s {
            "add" => Ok(PatchOp::Add),
            "replace" => Ok(PatchOp::Replace),
            "remove" => Ok(PatchOp::Remove),
            other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
        }
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// A single structural edit.
///
/// Path steps are positional: object keys are [`PathStep::Key`], array
/// indices and map/set positions are [`PathStep::Index`]. The special step
/// `"length"` on an array only appears in a `replace`. `add` and `replace`
/// carry a value; for maps, `add` carries a `[key, value]` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub op: PatchOp,
    pub path: Path,
    pub value: Option<Value>,
}

impl Patch {
    pub fn add(path: Path, value: Value) -> Self {
        Self {
            op: PatchOp::Add,
            path,
            value: Some(value),
        }
    }

    pub fn replace(path: Path, value: Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path,
            value: Some(value),
        }
    }

    pub fn remove(path: Path) -> Self {
        Self {
            op: PatchOp::Remove,
            path,
            value: None,
        }
    }

    pub fn value(&self) -> Result<&Value, PatchError> {
        self.value.as_ref().ok_or(PatchError::MissingValue)
    }
}

/// `base_path` with `step` appended.
pub(crate) fn join(base_path: &[PathStep], step: impl Into<PathStep>) -> Path {
    let mut path = Vec::with_capacity(base_path.len() + 1);
    path.extend_from_slice(base_path);
    path.push(step.into());
    path
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        super::codec::to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        super::codec::from_json(&json).map_err(serde::de::Error::custom)
    }
}
