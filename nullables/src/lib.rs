//! Nullable infrastructure for deterministic testing.
//!
//! The persistent Merkle tree is an external dependency abstracted behind
//! `strata_store::MutableTree`. This crate provides an in-memory
//! implementation that:
//! - Produces deterministic root hashes
//! - Keeps every saved version readable until it is deleted
//! - Never touches the filesystem
//!
//! Usage: hand an `Arc<MemTree>` to the state or the node in tests.

pub mod tree;

pub use tree::{MemSnapshot, MemTree};
