//! Canonical encoding of stored values.
//!
//! Values are bincode-encoded. A value that was written by this node and no
//! longer decodes means the store is corrupted, never that the input was bad.

use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_store::ImmutableTree;

use crate::StateError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StateError> {
    bincode::serialize(value).map_err(|e| StateError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, StateError> {
    bincode::deserialize(bytes).map_err(|e| StateError::Corrupted {
        key: hex::encode(key),
        reason: e.to_string(),
    })
}

/// Read and decode one key from a snapshot.
pub(crate) fn load<T: DeserializeOwned>(
    tree: &dyn ImmutableTree,
    key: &[u8],
) -> Result<Option<T>, StateError> {
    match tree.get(key)? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn corrupted(key: &[u8], reason: impl Into<String>) -> StateError {
    StateError::Corrupted {
        key: hex::encode(key),
        reason: reason.into(),
    }
}
