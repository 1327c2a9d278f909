//! Core logic of the `mutative-apply` binary.
//!
//! - `mutative-apply '<patches>'` applies a patch list to the document on
//!   stdin;
//! - `mutative-apply --recorded '<entries>'` replays recorded entries.
//!
//! Documents use the tagged JSON form of values, so maps and sets travel as
//! `{"$map": [[k, v], ...]}` and `{"$set": [...]}`.

use mutative_util::{from_json, to_json};
use serde_json::Value as Json;
use thiserror::Error;

use crate::patch::codec::from_json_patch;
use crate::patch::PatchError;
use crate::record::codec::from_json_log;
use crate::types::{ApplyOptions, MutativeError};
use crate::{apply, apply_patches};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] PatchError),
    #[error(transparent)]
    Apply(#[from] MutativeError),
    #[error("usage: mutative-apply [--recorded] '<json>' < document.json")]
    Usage,
}

/// What the second argument holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Patches,
    Recorded,
}

/// Splits command-line arguments (without the program name) into the mode
/// and the JSON argument.
pub fn parse_args(args: &[String]) -> Result<(Mode, &str), CliError> {
    match args {
        [json] if json != "--recorded" => Ok((Mode::Patches, json.as_str())),
        [flag, json] if flag == "--recorded" => Ok((Mode::Recorded, json.as_str())),
        _ => Err(CliError::Usage),
    }
}

/// Applies a JSON patch list to a document.
///
/// Returns the new document as a pretty-printed JSON string.
pub fn apply_patch_json(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc = from_json(&serde_json::from_str::<Json>(doc_json)?);
    let patches = from_json_patch(&serde_json::from_str(patch_json)?)?;
    let result = apply_patches(&doc, &patches, &ApplyOptions::default())?;
    Ok(serde_json::to_string_pretty(&to_json(&result))?)
}

/// Replays a JSON log of recorded entries against a document.
pub fn replay_json(doc_json: &str, log_json: &str) -> Result<String, CliError> {
    let doc = from_json(&serde_json::from_str::<Json>(doc_json)?);
    let entries = from_json_log(&serde_json::from_str(log_json)?)?;
    let result = apply(&doc, &entries, &ApplyOptions::default())?;
    Ok(serde_json::to_string_pretty(&to_json(&result))?)
}

pub fn run(mode: Mode, doc_json: &str, arg_json: &str) -> Result<String, CliError> {
    match mode {
        Mode::Patches => apply_patch_json(doc_json, arg_json),
        Mode::Recorded => replay_json(doc_json, arg_json),
    }
}
