//! Nullable tree: thread-safe in-memory versioned key/value storage.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use strata_crypto::blake2b_256_multi;
use strata_store::{ImmutableTree, MutableTree, StoreError, TreeEntry};
use strata_types::Hash;

type KvMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// One saved version.
pub struct MemSnapshot {
    data: KvMap,
    version: u64,
    hash: Hash,
}

impl MemSnapshot {
    fn new(data: KvMap, version: u64) -> Self {
        let hash = root_hash(&data);
        Self {
            data,
            version,
            hash,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ImmutableTree for MemSnapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<TreeEntry>, StoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn hash(&self) -> Hash {
        self.hash
    }
}

/// Blake2b over every length-prefixed key/value pair in key order.
fn root_hash(data: &KvMap) -> Hash {
    if data.is_empty() {
        return Hash::ZERO;
    }
    let mut acc = [0u8; 32];
    for (key, value) in data {
        let key_len = (key.len() as u32).to_be_bytes();
        let value_len = (value.len() as u32).to_be_bytes();
        acc = blake2b_256_multi(&[&acc, &key_len, key, &value_len, value]);
    }
    Hash::new(acc)
}

struct Inner {
    versions: BTreeMap<u64, Arc<MemSnapshot>>,
    working: KvMap,
    version: u64,
}

/// An in-memory versioned tree for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct MemTree {
    inner: Mutex<Inner>,
}

impl MemTree {
    pub fn new() -> Self {
        let mut versions = BTreeMap::new();
        versions.insert(0, Arc::new(MemSnapshot::new(KvMap::new(), 0)));
        Self {
            inner: Mutex::new(Inner {
                versions,
                working: KvMap::new(),
                version: 0,
            }),
        }
    }

    /// Number of keys in the working set.
    pub fn working_len(&self) -> usize {
        self.inner.lock().unwrap().working.len()
    }
}

impl Default for MemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MutableTree for MemTree {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().working.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .working
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<(), StoreError> {
        self.inner.lock().unwrap().working.remove(key);
        Ok(())
    }

    fn save_version(&self) -> Result<(Hash, u64), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let version = inner.version + 1;
        let snapshot = Arc::new(MemSnapshot::new(inner.working.clone(), version));
        let hash = snapshot.hash;
        inner.versions.insert(version, snapshot);
        inner.version = version;
        Ok((hash, version))
    }

    fn rollback(&self) {
        let mut inner = self.inner.lock().unwrap();
        let restored = inner
            .versions
            .get(&inner.version)
            .map(|s| s.data.clone())
            .unwrap_or_default();
        inner.working = restored;
    }

    fn version(&self) -> u64 {
        self.inner.lock().unwrap().version
    }

    fn immutable_at(&self, version: u64) -> Result<Arc<dyn ImmutableTree>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let snapshot: Arc<dyn ImmutableTree> = inner
            .versions
            .get(&version)
            .cloned()
            .ok_or(StoreError::VersionNotFound(version))?;
        Ok(snapshot)
    }

    fn delete_version(&self, version: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if version == inner.version {
            return Err(StoreError::VersionInUse(version));
        }
        inner
            .versions
            .remove(&version)
            .map(|_| ())
            .ok_or(StoreError::VersionNotFound(version))
    }

    fn available_versions(&self) -> Vec<u64> {
        self.inner.lock().unwrap().versions.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_and_save() {
        let tree = MemTree::new();
        tree.set(b"a1", b"one").unwrap();
        assert_eq!(tree.get(b"a1").unwrap(), Some(b"one".to_vec()));

        let (hash, version) = tree.save_version().unwrap();
        assert_eq!(version, 1);
        assert!(!hash.is_zero());
        assert_eq!(tree.latest().unwrap().hash(), hash);
    }

    #[test]
    fn test_old_versions_stay_readable() {
        let tree = MemTree::new();
        tree.set(b"k", b"v1").unwrap();
        tree.save_version().unwrap();
        tree.set(b"k", b"v2").unwrap();
        tree.save_version().unwrap();

        let v1 = tree.immutable_at(1).unwrap();
        let v2 = tree.immutable_at(2).unwrap();
        assert_eq!(v1.get(b"k").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(v2.get(b"k").unwrap(), Some(b"v2".to_vec()));
        assert_ne!(v1.hash(), v2.hash());
        assert!(tree.immutable_at(0).unwrap().get(b"k").unwrap().is_none());
    }

    #[test]
    fn test_rollback_discards_working_set() {
        let tree = MemTree::new();
        tree.set(b"k", b"keep").unwrap();
        tree.save_version().unwrap();
        tree.set(b"k", b"drop").unwrap();
        tree.set(b"x", b"drop").unwrap();
        tree.rollback();
        assert_eq!(tree.get(b"k").unwrap(), Some(b"keep".to_vec()));
        assert!(tree.get(b"x").unwrap().is_none());
    }

    #[test]
    fn test_hash_depends_only_on_content() {
        let a = MemTree::new();
        let b = MemTree::new();
        a.set(b"x", b"1").unwrap();
        a.set(b"y", b"2").unwrap();
        b.set(b"y", b"2").unwrap();
        b.set(b"x", b"1").unwrap();
        assert_eq!(a.save_version().unwrap().0, b.save_version().unwrap().0);
    }

    #[test]
    fn test_iterate_prefix_is_ordered_and_bounded() {
        let tree = MemTree::new();
        tree.set(b"f\x00\x02", b"b").unwrap();
        tree.set(b"f\x00\x01", b"a").unwrap();
        tree.set(b"g", b"other").unwrap();
        tree.save_version().unwrap();

        let entries = tree.latest().unwrap().iterate_prefix(b"f").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, b"a".to_vec());
        assert_eq!(entries[1].1, b"b".to_vec());
    }

    #[test]
    fn test_delete_version() {
        let tree = MemTree::new();
        tree.save_version().unwrap();
        tree.save_version().unwrap();
        tree.delete_version(1).unwrap();
        assert!(matches!(
            tree.immutable_at(1),
            Err(StoreError::VersionNotFound(1))
        ));
        assert!(matches!(
            tree.delete_version(2),
            Err(StoreError::VersionInUse(2))
        ));
        assert_eq!(tree.available_versions(), vec![0, 2]);
    }
}
