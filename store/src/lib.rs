//! Abstract storage traits for the Strata state.
//!
//! State is persisted in a versioned key/value tree: every committed block
//! produces a new immutable version with its own root hash. Backends (the
//! persistent Merkle tree in production, `strata-nullables::MemTree` in tests)
//! implement these traits; the rest of the codebase depends only on them.

pub mod batch;
pub mod error;
pub mod keys;
pub mod tree;

pub use batch::WriteBatch;
pub use error::StoreError;
pub use tree::{ImmutableTree, MutableTree, TreeEntry};
