//! A candidate's stake list: persisted layout and admission rules.
//!
//! In storage the list is a header `{count, tail}` plus one node per slot,
//! each linking to the next smaller stake. In memory it is a vector sorted
//! ascending by `(bip_value, owner, coin)`.

use std::collections::BTreeMap;

use strata_formula::mul_div_floor;
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::{Address, CoinId, PublicKey};

use super::model::{Stake, StakeHeader, StakeNode};
use crate::codec;
use crate::StateError;

pub(crate) struct StakeList {
    pub stakes: Vec<Stake>,
    pub total: u128,
    /// Nodes currently in storage; slots beyond the new count get deleted.
    persisted: u32,
    pub dirty: bool,
}

impl StakeList {
    pub(crate) fn empty() -> Self {
        Self {
            stakes: Vec::new(),
            total: 0,
            persisted: 0,
            dirty: false,
        }
    }

    pub(crate) fn load(tree: &dyn ImmutableTree, pubkey: &PublicKey) -> Result<Self, StateError> {
        let header_key = keys::stake_header(pubkey);
        let header: StakeHeader = codec::load(tree, &header_key)?.unwrap_or_default();
        let count = header.count as usize;

        let mut stakes = Vec::with_capacity(count);
        let mut cursor = header.tail;
        while let Some(index) = cursor {
            if stakes.len() == count {
                return Err(codec::corrupted(&header_key, "stake list longer than its header"));
            }
            let key = keys::stake_node(pubkey, index);
            let node: StakeNode = codec::load(tree, &key)?
                .ok_or_else(|| codec::corrupted(&key, "missing stake node"))?;
            stakes.push(node.stake);
            cursor = node.prev_index;
        }
        if stakes.len() != count {
            return Err(codec::corrupted(&header_key, "stake list shorter than its header"));
        }
        stakes.reverse();

        let total = codec::load(tree, &keys::total_stake(pubkey))?.unwrap_or(0);
        Ok(Self {
            stakes,
            total,
            persisted: header.count,
            dirty: false,
        })
    }

    pub fn find(&self, owner: &Address, coin: CoinId) -> Option<&Stake> {
        self.stakes
            .iter()
            .find(|s| s.owner == *owner && s.coin == coin)
    }

    pub fn find_mut(&mut self, owner: &Address, coin: CoinId) -> Option<&mut Stake> {
        self.stakes
            .iter_mut()
            .find(|s| s.owner == *owner && s.coin == coin)
    }

    /// Drop empty stakes, restore the ordering and recompute the total.
    pub(crate) fn normalize(&mut self) -> Result<(), StateError> {
        self.stakes.retain(|s| s.value > 0);
        self.stakes.sort_by_key(Stake::sort_key);
        self.total = self
            .stakes
            .iter()
            .try_fold(0u128, |acc, s| acc.checked_add(s.bip_value))
            .ok_or(StateError::Arithmetic("total stake"))?;
        Ok(())
    }

    /// Write the list with slot `i` holding the `i`-th smallest stake.
    pub(crate) fn flush(&self, pubkey: &PublicKey, batch: &mut WriteBatch) -> Result<(), StateError> {
        if !self.dirty {
            return Ok(());
        }
        let count = self.stakes.len() as u32;
        for (index, stake) in (0u32..).zip(&self.stakes) {
            let node = StakeNode {
                stake: stake.clone(),
                prev_index: index.checked_sub(1),
            };
            batch.put(keys::stake_node(pubkey, index), codec::encode(&node)?);
        }
        for stale in count..self.persisted {
            batch.delete(keys::stake_node(pubkey, stale));
        }
        let header = StakeHeader {
            count,
            tail: count.checked_sub(1),
        };
        batch.put(keys::stake_header(pubkey), codec::encode(&header)?);
        batch.put(keys::total_stake(pubkey), codec::encode(&self.total)?);
        Ok(())
    }

    pub(crate) fn rebase(&mut self) {
        self.persisted = self.stakes.len() as u32;
        self.dirty = false;
    }
}

/// Base-coin valuation of delegated coins.
///
/// Every holder of a coin is valued at the same average price: the sale
/// return of the coin's whole delegated amount, pro rata.
#[derive(Debug, Default)]
pub(crate) struct CoinPrices {
    /// coin -> (sale return of the total, total delegated)
    by_coin: BTreeMap<CoinId, (u128, u128)>,
}

impl CoinPrices {
    pub(crate) fn insert(&mut self, coin: CoinId, sale_return: u128, total: u128) {
        self.by_coin.insert(coin, (sale_return, total));
    }

    pub(crate) fn value(&self, coin: CoinId, amount: u128) -> u128 {
        if coin.is_base_coin() {
            return amount;
        }
        match self.by_coin.get(&coin) {
            Some(&(ret, total)) => mul_div_floor(ret, amount, total).unwrap_or(0),
            None => 0,
        }
    }
}

/// What happened to a pending delegation offered to a stake list.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Added to the owner's existing stake in the same coin.
    Merged,
    Inserted,
    /// Took the place of the smallest stake, which is returned for refund.
    Evicted(Stake),
    /// Worth no more than the smallest stake of a full list; returned for refund.
    Rejected(Stake),
}

pub(crate) fn admit(
    stakes: &mut Vec<Stake>,
    mut update: Stake,
    prices: &CoinPrices,
    capacity: usize,
) -> Admission {
    if let Some(existing) = stakes
        .iter_mut()
        .find(|s| s.owner == update.owner && s.coin == update.coin)
    {
        existing.value = existing.value.saturating_add(update.value);
        existing.bip_value = prices.value(existing.coin, existing.value);
        return Admission::Merged;
    }

    update.bip_value = prices.value(update.coin, update.value);
    if stakes.len() < capacity {
        stakes.push(update);
        return Admission::Inserted;
    }

    let smallest = stakes
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.sort_key())
        .map(|(i, _)| i);
    match smallest {
        Some(i) if update.bip_value > stakes[i].bip_value => {
            Admission::Evicted(std::mem::replace(&mut stakes[i], update))
        }
        _ => Admission::Rejected(update),
    }
}
