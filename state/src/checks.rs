//! Registry of redeemed checks.

use std::collections::BTreeSet;
use std::sync::Arc;

use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::Hash;

use crate::StateError;

const USED: &[u8] = &[1];

pub struct Checks {
    base: Arc<dyn ImmutableTree>,
    used: BTreeSet<Hash>,
}

impl Checks {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            used: BTreeSet::new(),
        }
    }

    pub fn is_check_used(&self, hash: &Hash) -> Result<bool, StateError> {
        if self.used.contains(hash) {
            return Ok(true);
        }
        Ok(self.base.get(&keys::used_check(hash))?.is_some())
    }

    pub fn use_check(&mut self, hash: Hash) {
        self.used.insert(hash);
    }

    /// Every redeemed check digest, ascending.
    pub fn all(&self) -> Result<Vec<Hash>, StateError> {
        let mut all = self.used.clone();
        for (key, _) in self.base.iterate_prefix(&[keys::CHECK_PREFIX])? {
            let raw: [u8; 32] = key
                .get(1..)
                .and_then(|rest| rest.try_into().ok())
                .ok_or_else(|| crate::codec::corrupted(&key, "malformed check key"))?;
            all.insert(Hash::new(raw));
        }
        Ok(all.into_iter().collect())
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) {
        for hash in &self.used {
            batch.put(keys::used_check(hash), USED.to_vec());
        }
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.used.clear();
    }
}
