//! Transactions admitted by `check_tx` and not yet seen in a block.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use strata_types::Hash;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnconfirmedTxs {
    /// Transactions waiting, regardless of `limit`.
    pub count: usize,
    pub total_bytes: usize,
    /// Hashes of the oldest `limit` transactions, in admission order.
    pub hashes: Vec<Hash>,
}

#[derive(Default)]
pub struct Mempool {
    order: VecDeque<Hash>,
    txs: HashMap<Hash, Vec<u8>>,
    total_bytes: usize,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.txs.contains_key(hash)
    }

    /// Returns `false` if the transaction is already pooled.
    pub fn insert(&mut self, hash: Hash, raw: Vec<u8>) -> bool {
        if self.txs.contains_key(&hash) {
            return false;
        }
        self.total_bytes += raw.len();
        self.order.push_back(hash);
        self.txs.insert(hash, raw);
        true
    }

    pub fn remove(&mut self, hash: &Hash) -> Option<Vec<u8>> {
        let raw = self.txs.remove(hash)?;
        self.total_bytes -= raw.len();
        self.order.retain(|h| h != hash);
        Some(raw)
    }

    /// Empty the pool, oldest first.
    pub fn drain(&mut self) -> Vec<(Hash, Vec<u8>)> {
        self.total_bytes = 0;
        let mut txs = std::mem::take(&mut self.txs);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|hash| txs.remove(&hash).map(|raw| (hash, raw)))
            .collect()
    }

    pub fn unconfirmed(&self, limit: usize) -> UnconfirmedTxs {
        UnconfirmedTxs {
            count: self.txs.len(),
            total_bytes: self.total_bytes,
            hashes: self.order.iter().take(limit).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u8) -> Hash {
        Hash::new([n; 32])
    }

    #[test]
    fn counts_bytes_and_keeps_order() {
        let mut pool = Mempool::new();
        assert!(pool.insert(h(2), vec![0; 10]));
        assert!(pool.insert(h(1), vec![0; 5]));
        assert!(!pool.insert(h(2), vec![0; 10]));

        let stats = pool.unconfirmed(1);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_bytes, 15);
        assert_eq!(stats.hashes, vec![h(2)]);

        assert_eq!(pool.remove(&h(2)).map(|raw| raw.len()), Some(10));
        assert_eq!(pool.unconfirmed(10).hashes, vec![h(1)]);
        assert_eq!(pool.unconfirmed(10).total_bytes, 5);
    }

    #[test]
    fn drain_returns_admission_order() {
        let mut pool = Mempool::new();
        pool.insert(h(3), vec![1]);
        pool.insert(h(1), vec![2]);
        let drained: Vec<Hash> = pool.drain().into_iter().map(|(hash, _)| hash).collect();
        assert_eq!(drained, vec![h(3), h(1)]);
        assert!(pool.is_empty());
        assert_eq!(pool.unconfirmed(5).total_bytes, 0);
    }
}
