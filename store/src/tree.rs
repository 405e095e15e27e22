//! Versioned tree traits.

use std::sync::Arc;

use strata_types::Hash;

use crate::StoreError;

/// A raw key/value pair read from a tree.
pub type TreeEntry = (Vec<u8>, Vec<u8>);

/// A read-only snapshot of one saved version.
///
/// Snapshots are shared between state views through `Arc` and never change
/// after they are created.
pub trait ImmutableTree: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<TreeEntry>, StoreError>;

    /// The version this snapshot was saved as (0 for the empty tree).
    fn version(&self) -> u64;

    /// Root hash of this version.
    fn hash(&self) -> Hash;
}

/// The working tree: one mutable working set on top of the latest version.
///
/// Methods take `&self`; implementations synchronise internally so a tree
/// can be shared with out-of-band jobs (export, pruning) through `Arc`.
pub trait MutableTree: Send + Sync {
    /// Read from the working set (uncommitted writes included).
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn remove(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Persist the working set as a new version.
    fn save_version(&self) -> Result<(Hash, u64), StoreError>;

    /// Discard every write since the last saved version.
    fn rollback(&self);

    /// The latest saved version.
    fn version(&self) -> u64;

    /// A read-only snapshot of a saved version.
    fn immutable_at(&self, version: u64) -> Result<Arc<dyn ImmutableTree>, StoreError>;

    /// A read-only snapshot of the latest saved version.
    fn latest(&self) -> Result<Arc<dyn ImmutableTree>, StoreError> {
        self.immutable_at(self.version())
    }

    fn delete_version(&self, version: u64) -> Result<(), StoreError>;

    /// Saved versions still available for reading, ascending.
    fn available_versions(&self) -> Vec<u64>;
}
