//! Freezable container node.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// A mutator was called on a frozen container.
    #[error("Cannot modify frozen data")]
    Frozen,
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Payload of a container value plus its frozen flag.
///
/// Reads go through `Deref`. Writes go through [`Node::get_mut`], which fails
/// closed once the node is frozen. The flag is atomic so that freezing works
/// through shared `Arc`s and is visible to every holder.
pub struct Node<T> {
    data: T,
    frozen: AtomicBool,
}

impl<T> Node<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            frozen: AtomicBool::new(false),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Marks the node frozen. Returns `false` if it already was.
    pub fn freeze(&self) -> bool {
        !self.frozen.swap(true, Ordering::AcqRel)
    }

    pub fn get_mut(&mut self) -> Result<&mut T, WriteError> {
        if self.is_frozen() {
            return Err(WriteError::Frozen);
        }
        Ok(&mut self.data)
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> Deref for Node<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            frozen: AtomicBool::new(self.is_frozen()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_is_one_way() {
        let mut node = Node::new(vec![1, 2]);
        node.get_mut().unwrap().push(3);
        assert!(node.freeze());
        assert!(!node.freeze());
        assert_eq!(node.get_mut(), Err(WriteError::Frozen));
        assert_eq!(*node, vec![1, 2, 3]);
    }

    #[test]
    fn test_clone_keeps_flag() {
        let node = Node::new(1u8);
        node.freeze();
        assert!(node.clone().is_frozen());
    }
}
