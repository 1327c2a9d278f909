//! Core types shared by the draft engine, the patch generator and the
//! appliers.

use std::fmt;

use mutative_util::{Value, WriteError};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MutativeError {
    /// Immutable write or container type mismatch on a plain value.
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("a value of kind {0} cannot be drafted")]
    NotDraftable(&'static str),
    #[error("expected {expected} draft, found {found}")]
    WrongDraftType { expected: DraftType, found: DraftType },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl MutativeError {
    pub fn is_frozen(&self) -> bool {
        matches!(self, MutativeError::Write(WriteError::Frozen))
    }
}

// ── Draft type ────────────────────────────────────────────────────────────

/// Container variant of a draft. The discriminants are the wire tags used by
/// recorded entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftType {
    Object = 0,
    Array = 1,
    Map = 2,
    Set = 3,
}

impl DraftType {
    /// The draft type for a container value, `None` for scalars.
    pub fn of(value: &Value) -> Option<DraftType> {
        match value {
            Value::Object(_) => Some(DraftType::Object),
            Value::Array(_) => Some(DraftType::Array),
            Value::Map(_) => Some(DraftType::Map),
            Value::Set(_) => Some(DraftType::Set),
            _ => None,
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn from_tag(tag: u64) -> Option<DraftType> {
        match tag {
            0 => Some(DraftType::Object),
            1 => Some(DraftType::Array),
            2 => Some(DraftType::Map),
            3 => Some(DraftType::Set),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftType::Object => "object",
            DraftType::Array => "array",
            DraftType::Map => "map",
            DraftType::Set => "set",
        }
    }
}

impl fmt::Display for DraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Options for [`crate::create`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Generate forward and inverse patches on finalize.
    pub enable_patches: bool,
    /// Deep-freeze the produced state.
    pub enable_auto_freeze: bool,
    /// Record every draft mutation as a replayable entry.
    pub record: bool,
}

impl Options {
    pub fn with_patches() -> Self {
        Self {
            enable_patches: true,
            ..Self::default()
        }
    }
}

/// Options for [`crate::apply`] and [`crate::apply_patches`].
///
/// Replaying never generates patches or records entries.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub enable_auto_freeze: bool,
}

impl From<&ApplyOptions> for Options {
    fn from(options: &ApplyOptions) -> Self {
        Self {
            enable_patches: false,
            enable_auto_freeze: options.enable_auto_freeze,
            record: false,
        }
    }
}
