//! Structural patches.
//!
//! A [`Patch`] is one `add`, `replace` or `remove` at a positional path. The
//! draft engine emits a forward list and an inverse list on finalize
//! ([`generate`]); [`apply_patches`] replays a list against a base value.

mod apply;
pub mod codec;
pub mod generate;
mod types;

pub(crate) use apply::{array_length, map_pair};
pub use apply::apply_patches;
pub use generate::{finalize_patches, generate_patches};
pub use types::{Patch, PatchError, PatchOp};
