use mutative_json_pointer::{Path, PathStep};
use mutative_util::Value;

use super::{ArrayDraft, Draft, DraftId, MapDraft, ObjectDraft, SetDraft};
use crate::types::{DraftType, MutativeError};

/// Untyped handle to one draft of a session.
///
/// Narrow it with [`DraftRef::object`], [`DraftRef::array`],
/// [`DraftRef::map`] or [`DraftRef::set`] to write.
#[derive(Debug)]
pub struct DraftRef<'a> {
    pub(crate) draft: &'a mut Draft,
    pub(crate) id: DraftId,
}

impl<'a> DraftRef<'a> {
    pub(crate) fn new(draft: &'a mut Draft, id: DraftId) -> Self {
        Self { draft, id }
    }

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn kind(&self) -> DraftType {
        self.draft.drafts[self.id].kind
    }

    /// Positional path of this draft from the session root.
    pub fn path(&self) -> Path {
        self.draft.path_of(self.id)
    }

    /// Materialized current value of this draft.
    pub fn current(&self) -> Value {
        self.draft.current_of(self.id)
    }

    pub fn original(&self) -> &Value {
        self.draft.original(self.id)
    }

    pub fn len(&self) -> usize {
        self.draft.len_of(self.id)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current value of a member, addressed positionally.
    pub fn get_at(&self, step: impl Into<PathStep>) -> Option<Value> {
        let mut path = self.path();
        path.push(step.into());
        self.draft.value_at(&path)
    }

    /// Child draft at a positional step. `None` for missing members and
    /// scalars.
    pub fn child(&mut self, step: impl Into<PathStep>) -> Option<DraftRef<'_>> {
        let id = self.draft.child_id(self.id, &step.into())?;
        Some(DraftRef::new(self.draft, id))
    }

    /// Like [`DraftRef::child`], consuming the handle.
    pub fn into_child(self, step: impl Into<PathStep>) -> Option<DraftRef<'a>> {
        let id = self.draft.child_id(self.id, &step.into())?;
        Some(DraftRef::new(self.draft, id))
    }

    fn expect_kind(&self, expected: DraftType) -> Result<(), MutativeError> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(MutativeError::WrongDraftType { expected, found })
        }
    }

    pub fn object(self) -> Result<ObjectDraft<'a>, MutativeError> {
        self.expect_kind(DraftType::Object)?;
        Ok(ObjectDraft { inner: self })
    }

    pub fn array(self) -> Result<ArrayDraft<'a>, MutativeError> {
        self.expect_kind(DraftType::Array)?;
        Ok(ArrayDraft { inner: self })
    }

    pub fn map(self) -> Result<MapDraft<'a>, MutativeError> {
        self.expect_kind(DraftType::Map)?;
        Ok(MapDraft { inner: self })
    }

    pub fn set(self) -> Result<SetDraft<'a>, MutativeError> {
        self.expect_kind(DraftType::Set)?;
        Ok(SetDraft { inner: self })
    }

    pub(crate) fn parts(&mut self) -> (&mut Draft, DraftId) {
        (&mut *self.draft, self.id)
    }
}

/// Implements `Deref<Target = DraftRef>` for a typed handle.
macro_rules! typed_handle {
    ($name:ident) => {
        impl<'a> std::ops::Deref for $name<'a> {
            type Target = $crate::draft::DraftRef<'a>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl<'a> std::ops::DerefMut for $name<'a> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.inner
            }
        }

        impl<'a> $name<'a> {
            pub fn into_inner(self) -> $crate::draft::DraftRef<'a> {
                self.inner
            }
        }
    };
}

pub(crate) use typed_handle;
