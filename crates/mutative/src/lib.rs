//! mutative — drafts over immutable value trees.
//!
//! A draft session ([`create`]) lets a recipe mutate a working copy of a
//! base [`Value`] while the base stays untouched. Finalizing yields the new
//! state, which shares every unchanged subtree with the base, plus:
//!
//! - forward and inverse [`Patch`] lists, when `enable_patches` is set;
//! - a log of [`RecordedEntry`] values, when `record` is set.
//!
//! [`apply_patches`] and [`apply`] replay those artefacts against a base.
//! [`freeze`] makes a value tree reject all writes.
//!
//! ```
//! use mutative::{apply_patches, create, ApplyOptions, Options};
//! use mutative_util::Value;
//!
//! let base = Value::map([(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(2))]);
//! let produced = create(
//!     &base,
//!     |draft| {
//!         draft.root().map()?.set(Value::from("a"), Value::from(9));
//!         Ok(())
//!     },
//!     &Options::with_patches(),
//! )
//! .unwrap();
//!
//! let forward = apply_patches(&base, &produced.patches, &ApplyOptions::default()).unwrap();
//! assert_eq!(forward, produced.state);
//! let back = apply_patches(&produced.state, &produced.inverse_patches, &ApplyOptions::default()).unwrap();
//! assert_eq!(back, base);
//! ```

pub mod apply;
pub mod cli;
pub mod draft;
pub mod freeze;
pub mod patch;
pub mod record;
pub mod types;

pub use apply::{apply, get_value};
pub use draft::{
    create, produce, ArrayDraft, AssignedMap, Draft, DraftId, DraftRef, MapDraft, ObjectDraft,
    Produced, ProxyDraft, SetDraft,
};
pub use freeze::{freeze, is_frozen};
pub use patch::{apply_patches, finalize_patches, generate_patches, Patch, PatchError, PatchOp};
pub use record::{Arg, Operation, RecordedEntry};
pub use types::{ApplyOptions, DraftType, MutativeError, Options};

pub use mutative_json_pointer::{Path, PathStep};
pub use mutative_util::Value;
