//! Ordered write batch applied to a `MutableTree` in one step.

use std::collections::BTreeMap;

use crate::{MutableTree, StoreError};

/// Pending writes keyed by path. A `None` value deletes the key.
///
/// Keys are applied in ascending byte order so every node produces the same
/// sequence of tree operations for the same block.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.insert(key, None);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every operation. Stops at the first backend error; the caller
    /// is expected to roll the tree back.
    pub fn apply(&self, tree: &dyn MutableTree) -> Result<(), StoreError> {
        for (key, value) in &self.ops {
            match value {
                Some(v) => tree.set(key, v)?,
                None => tree.remove(key)?,
            }
        }
        Ok(())
    }
}
