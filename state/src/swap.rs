//! Constant-product swap pools keyed by unordered coin pair.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_formula::{amm, SwapError};
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::CoinId;

use crate::codec;
use crate::StateError;

/// A pool; `coin0 < coin1` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub coin0: CoinId,
    pub coin1: CoinId,
    pub reserve0: u128,
    pub reserve1: u128,
}

impl Pool {
    /// `(reserve_in, reserve_out)` for a trade selling `coin_in`.
    pub fn reserves_for(&self, coin_in: CoinId) -> (u128, u128) {
        if coin_in == self.coin0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    /// Move `amount_in` of `coin_in` into the pool and `amount_out` of the
    /// other coin out of it.
    pub fn apply(&mut self, coin_in: CoinId, amount_in: u128, amount_out: u128) -> Result<(), StateError> {
        let (reserve_in, reserve_out) = if coin_in == self.coin0 {
            (&mut self.reserve0, &mut self.reserve1)
        } else {
            (&mut self.reserve1, &mut self.reserve0)
        };
        *reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(StateError::Arithmetic("pool reserve"))?;
        *reserve_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(SwapError::InsufficientLiquidity)?;
        Ok(())
    }
}

fn ordered(a: CoinId, b: CoinId) -> (CoinId, CoinId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct Swap {
    base: Arc<dyn ImmutableTree>,
    cache: BTreeMap<(CoinId, CoinId), Pool>,
    dirty: BTreeSet<(CoinId, CoinId)>,
}

impl Swap {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            cache: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn pool(&mut self, a: CoinId, b: CoinId) -> Result<Option<&mut Pool>, StateError> {
        let pair = ordered(a, b);
        if a == b {
            return Ok(None);
        }
        if !self.cache.contains_key(&pair) {
            match codec::load::<Pool>(self.base.as_ref(), &keys::swap_pool(a, b))? {
                Some(pool) => {
                    self.cache.insert(pair, pool);
                }
                None => return Ok(None),
            }
        }
        Ok(self.cache.get_mut(&pair))
    }

    fn existing(&mut self, a: CoinId, b: CoinId) -> Result<&mut Pool, StateError> {
        self.pool(a, b)?
            .ok_or_else(|| SwapError::PairNotExists(a, b).into())
    }

    pub fn pair(&mut self, a: CoinId, b: CoinId) -> Result<Option<Pool>, StateError> {
        Ok(self.pool(a, b)?.map(|pool| pool.clone()))
    }

    pub fn is_exist(&mut self, a: CoinId, b: CoinId) -> Result<bool, StateError> {
        Ok(self.pool(a, b)?.is_some())
    }

    /// Seed a new pool. Moving the seeded amounts out of the provider's
    /// balance is the caller's job.
    pub fn create_pair(
        &mut self,
        a: CoinId,
        amount_a: u128,
        b: CoinId,
        amount_b: u128,
    ) -> Result<(), StateError> {
        if a == b || amount_a == 0 || amount_b == 0 {
            return Err(SwapError::InsufficientLiquidity.into());
        }
        if self.is_exist(a, b)? {
            return Err(StateError::PairExists(a, b));
        }
        let (coin0, coin1) = ordered(a, b);
        let (reserve0, reserve1) = if coin0 == a {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        self.cache.insert(
            (coin0, coin1),
            Pool {
                coin0,
                coin1,
                reserve0,
                reserve1,
            },
        );
        self.dirty.insert((coin0, coin1));
        Ok(())
    }

    /// Output of selling `amount_in` of `coin_in` for `coin_out`.
    pub fn calculate_buy_for_sell(
        &mut self,
        coin_in: CoinId,
        coin_out: CoinId,
        amount_in: u128,
    ) -> Result<u128, StateError> {
        let (reserve_in, reserve_out) = self.existing(coin_in, coin_out)?.reserves_for(coin_in);
        Ok(amm::calculate_buy_for_sell(reserve_in, reserve_out, amount_in)?)
    }

    /// Input of `coin_in` needed to receive `amount_out` of `coin_out`.
    pub fn calculate_sell_for_buy(
        &mut self,
        coin_in: CoinId,
        coin_out: CoinId,
        amount_out: u128,
    ) -> Result<u128, StateError> {
        let (reserve_in, reserve_out) = self.existing(coin_in, coin_out)?.reserves_for(coin_in);
        Ok(amm::calculate_sell_for_buy(reserve_in, reserve_out, amount_out)?)
    }

    /// Sell exactly `amount_in`, receiving at least `min_out`. Returns the output.
    pub fn swap_sell(
        &mut self,
        coin_in: CoinId,
        coin_out: CoinId,
        amount_in: u128,
        min_out: u128,
    ) -> Result<u128, StateError> {
        let amount_out = self.calculate_buy_for_sell(coin_in, coin_out, amount_in)?;
        amm::check_swap(amount_out, min_out)?;
        self.existing(coin_in, coin_out)?
            .apply(coin_in, amount_in, amount_out)?;
        self.dirty.insert(ordered(coin_in, coin_out));
        Ok(amount_out)
    }

    /// Buy exactly `amount_out`, paying at most `max_in`. Returns the input.
    pub fn swap_buy(
        &mut self,
        coin_in: CoinId,
        coin_out: CoinId,
        amount_out: u128,
        max_in: u128,
    ) -> Result<u128, StateError> {
        let amount_in = self.calculate_sell_for_buy(coin_in, coin_out, amount_out)?;
        if amount_in > max_in {
            return Err(SwapError::InsufficientInputAmount {
                need: amount_in,
                max: max_in,
            }
            .into());
        }
        self.existing(coin_in, coin_out)?
            .apply(coin_in, amount_in, amount_out)?;
        self.dirty.insert(ordered(coin_in, coin_out));
        Ok(amount_in)
    }

    /// Every pool, ascending by pair.
    pub fn all(&mut self) -> Result<Vec<Pool>, StateError> {
        for (key, value) in self.base.iterate_prefix(&[keys::SWAP_PREFIX])? {
            let pool: Pool = codec::decode(&key, &value)?;
            self.cache.entry((pool.coin0, pool.coin1)).or_insert(pool);
        }
        Ok(self.cache.values().cloned().collect())
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        for pair in &self.dirty {
            if let Some(pool) = self.cache.get(pair) {
                batch.put(keys::swap_pool(pair.0, pair.1), codec::encode(pool)?);
            }
        }
        Ok(())
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.dirty.clear();
    }
}
