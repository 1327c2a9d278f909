//! Type definitions for patch paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A step in a patch path.
///
/// Object properties are addressed by key. Array elements, map entries and
/// set members are addressed by index; for maps and sets the index is the
/// member's position in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    Index(usize),
    Key(String),
}

/// A path from the root of a value tree.
pub type Path = Vec<PathStep>;

impl PathStep {
    /// Returns the step as an index.
    ///
    /// Keys that spell a canonical non-negative integer (`"0"`, `"12"`) are
    /// accepted too, since a step may have travelled through a string-only
    /// encoding such as a JSON Pointer.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(i) => Some(*i),
            PathStep::Key(k) if crate::is_valid_index(k) => k.parse().ok(),
            PathStep::Key(_) => None,
        }
    }

    /// Returns the step as a property key, stringifying indices.
    pub fn to_key(&self) -> String {
        match self {
            PathStep::Index(i) => i.to_string(),
            PathStep::Key(k) => k.clone(),
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Index(i) => write!(f, "{i}"),
            PathStep::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<&String> for PathStep {
    fn from(key: &String) -> Self {
        PathStep::Key(key.clone())
    }
}
