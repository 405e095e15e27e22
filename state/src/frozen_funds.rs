//! Funds locked until a release height (unbonded and slashed stakes).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::{Address, CoinId, PublicKey};

use crate::accounts::Accounts;
use crate::app::App;
use crate::coins::Coins;
use crate::slash::{self, Slash};
use crate::{codec, StateError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenFund {
    pub owner: Address,
    pub candidate: PublicKey,
    pub coin: CoinId,
    pub value: u128,
}

pub struct FrozenFunds {
    base: Arc<dyn ImmutableTree>,
    cache: BTreeMap<u64, Vec<FrozenFund>>,
    dirty: BTreeSet<u64>,
}

impl FrozenFunds {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            cache: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn funds_at(&mut self, height: u64) -> Result<&mut Vec<FrozenFund>, StateError> {
        if !self.cache.contains_key(&height) {
            let loaded = codec::load(self.base.as_ref(), &keys::frozen_funds(height))?;
            self.cache.insert(height, loaded.unwrap_or_default());
        }
        Ok(self.cache.entry(height).or_default())
    }

    /// Heights in `[from, to]` holding funds, stored or cached.
    fn heights_between(&self, from: u64, to: u64) -> Result<BTreeSet<u64>, StateError> {
        let mut heights: BTreeSet<u64> = self.cache.range(from..=to).map(|(h, _)| *h).collect();
        for (key, _) in self.base.iterate_prefix(&[keys::FROZEN_FUNDS_PREFIX])? {
            let height = keys::frozen_funds_height(&key)
                .ok_or_else(|| codec::corrupted(&key, "malformed frozen funds key"))?;
            if (from..=to).contains(&height) {
                heights.insert(height);
            }
        }
        Ok(heights)
    }

    pub fn add_frozen_fund(
        &mut self,
        height: u64,
        owner: Address,
        candidate: PublicKey,
        coin: CoinId,
        value: u128,
    ) -> Result<(), StateError> {
        if value == 0 {
            return Ok(());
        }
        self.funds_at(height)?.push(FrozenFund {
            owner,
            candidate,
            coin,
            value,
        });
        self.dirty.insert(height);
        Ok(())
    }

    pub fn get_frozen_funds(&mut self, height: u64) -> Result<Vec<FrozenFund>, StateError> {
        Ok(self.funds_at(height)?.clone())
    }

    /// Credit every fund queued at exactly `height` to its owner and drop the
    /// entry. Returns the released funds.
    pub fn release(
        &mut self,
        height: u64,
        accounts: &mut Accounts,
    ) -> Result<Vec<FrozenFund>, StateError> {
        let funds = std::mem::take(self.funds_at(height)?);
        if funds.is_empty() {
            return Ok(funds);
        }
        self.dirty.insert(height);
        for fund in &funds {
            accounts.add_balance(&fund.owner, fund.coin, fund.value)?;
        }
        tracing::debug!(height, released = funds.len(), "frozen funds released");
        Ok(funds)
    }

    /// Slash every fund of `candidate` waiting in `[from, to]`, keeping 95%.
    pub fn punish_frozen_funds_with_candidate(
        &mut self,
        from: u64,
        to: u64,
        candidate: &PublicKey,
        coins: &mut Coins,
        app: &mut App,
    ) -> Result<Vec<Slash>, StateError> {
        let mut slashes = Vec::new();
        for height in self.heights_between(from, to)? {
            let mut funds = std::mem::take(self.funds_at(height)?);
            let mut touched = false;
            for fund in funds.iter_mut().filter(|f| f.candidate == *candidate) {
                let (kept, slashed) = slash::split(fund.value);
                slash::burn(coins, app, fund.coin, slashed)?;
                fund.value = kept;
                touched = true;
                slashes.push(Slash {
                    owner: fund.owner,
                    coin: fund.coin,
                    slashed,
                    kept,
                });
            }
            funds.retain(|f| f.value > 0);
            *self.funds_at(height)? = funds;
            if touched {
                self.dirty.insert(height);
            }
        }
        Ok(slashes)
    }

    /// Every queued fund with its release height, ascending by height.
    pub fn all(&mut self) -> Result<Vec<(u64, FrozenFund)>, StateError> {
        let heights = self.heights_between(0, u64::MAX)?;
        let mut out = Vec::new();
        for height in heights {
            for fund in self.funds_at(height)?.iter() {
                out.push((height, fund.clone()));
            }
        }
        Ok(out)
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        for height in &self.dirty {
            let key = keys::frozen_funds(*height);
            match self.cache.get(height) {
                Some(funds) if !funds.is_empty() => batch.put(key, codec::encode(funds)?),
                _ => batch.delete(key),
            }
        }
        Ok(())
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.dirty.clear();
    }
}
