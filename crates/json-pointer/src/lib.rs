//! Patch paths and JSON Pointer (RFC 6901) helpers.
//!
//! A [`Path`] is a sequence of [`PathStep`]s from the root of a value tree.
//! Patches carry paths in this form; JSON Pointer strings are supported as a
//! textual encoding for CLI use and debugging.
//!
//! # Example
//!
//! ```
//! use mutative_json_pointer::{format_json_pointer, parse_json_pointer, PathStep};
//!
//! let path = vec![PathStep::from("users"), PathStep::Index(0), PathStep::from("a/b")];
//! let pointer = format_json_pointer(&path);
//! assert_eq!(pointer, "/users/0/a~1b");
//!
//! // Indices come back as keys; consumers call `PathStep::as_index` as needed.
//! let parsed = parse_json_pointer(&pointer);
//! assert_eq!(parsed[1].as_index(), Some(0));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_json_pointer, ValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Unescapes a JSON Pointer path component.
///
/// ```
/// use mutative_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use mutative_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path steps.
///
/// Every step comes back as [`PathStep::Key`]; a pointer does not say whether
/// `"0"` addresses a property or an index.
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer[1..]
        .split('/')
        .map(|c| PathStep::Key(unescape_component(c)))
        .collect()
}

/// Parse a JSON Pointer string after validating it.
pub fn try_parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    validate_json_pointer(pointer)?;
    Ok(parse_json_pointer(pointer))
}

/// Format path steps into a JSON Pointer string.
///
/// ```
/// use mutative_json_pointer::{format_json_pointer, PathStep};
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&[PathStep::from("a"), PathStep::Index(2)]), "/a/2");
/// ```
pub fn format_json_pointer(path: &[PathStep]) -> String {
    let mut out = String::with_capacity(path.len() * 8);
    for step in path {
        out.push('/');
        match step {
            PathStep::Index(i) => out.push_str(&i.to_string()),
            PathStep::Key(k) => out.push_str(&escape_component(k)),
        }
    }
    out
}

/// Check if a string is a canonical non-negative integer index.
///
/// ```
/// use mutative_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("length"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}
