//! Coin registry and the bonding-curve view of each coin.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_formula::{bancor, CurveError};
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::params::MIN_COIN_RESERVE;
use strata_types::{Address, CoinId, CoinSymbol};

use crate::codec;
use crate::StateError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub symbol: CoinSymbol,
    pub version: u32,
    pub name: String,
    /// Circulating supply.
    pub volume: u128,
    /// Base-coin backing.
    pub reserve: u128,
    /// Constant reserve ratio, percent.
    pub crr: u32,
    pub max_supply: u128,
    pub owner: Option<Address>,
}

impl Coin {
    /// The base coin. It is never stored: it has no curve and every
    /// conversion into or out of it is the identity.
    pub fn base() -> Self {
        Self {
            id: CoinId::BASE,
            symbol: CoinSymbol::base(),
            version: 0,
            name: "Base coin".to_string(),
            volume: 0,
            reserve: 0,
            crr: 0,
            max_supply: u128::MAX,
            owner: None,
        }
    }

    pub fn is_base(&self) -> bool {
        self.id.is_base_coin()
    }

    /// Base coin received for selling `amount` of this coin.
    pub fn sale_return(&self, amount: u128) -> Result<u128, CurveError> {
        if self.is_base() {
            return Ok(amount);
        }
        bancor::sale_return(self.volume, self.reserve, self.crr, amount)
    }

    /// Coins minted for a base-coin `deposit`.
    pub fn purchase_return(&self, deposit: u128) -> Result<u128, CurveError> {
        if self.is_base() {
            return Ok(deposit);
        }
        bancor::purchase_return(self.volume, self.reserve, self.crr, deposit)
    }

    /// Coins to sell to receive `want` base coin.
    pub fn sale_amount(&self, want: u128) -> Result<u128, CurveError> {
        if self.is_base() {
            return Ok(want);
        }
        bancor::sale_amount(self.volume, self.reserve, self.crr, want)
    }

    /// Base coin to deposit to mint `want` coins.
    pub fn buy_deposit(&self, want: u128) -> Result<u128, CurveError> {
        if self.is_base() {
            return Ok(want);
        }
        bancor::buy_deposit(self.volume, self.reserve, self.crr, want)
    }

    /// Fails when removing `delta` from the reserve leaves less than the
    /// minimum coin reserve.
    pub fn check_reserve_underflow(&self, delta: u128) -> Result<(), CurveError> {
        if self.is_base() {
            return Ok(());
        }
        let available = self.reserve.saturating_sub(MIN_COIN_RESERVE);
        if delta > available {
            return Err(CurveError::ReserveUnderflow {
                requested: delta,
                available,
            });
        }
        Ok(())
    }

    /// Fails when adding `delta` to the volume exceeds `max_supply`.
    pub fn check_supply_overflow(&self, delta: u128) -> Result<(), CurveError> {
        if self.is_base() {
            return Ok(());
        }
        match self.volume.checked_add(delta) {
            Some(total) if total <= self.max_supply => Ok(()),
            _ => Err(CurveError::SupplyOverflow),
        }
    }
}

pub struct Coins {
    base: Arc<dyn ImmutableTree>,
    cache: BTreeMap<CoinId, Coin>,
    symbols: BTreeMap<CoinSymbol, CoinId>,
    dirty: BTreeSet<CoinId>,
    dirty_symbols: BTreeSet<CoinSymbol>,
}

impl Coins {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            cache: BTreeMap::new(),
            symbols: BTreeMap::new(),
            dirty: BTreeSet::new(),
            dirty_symbols: BTreeSet::new(),
        }
    }

    fn coin(&mut self, id: CoinId) -> Result<Option<&mut Coin>, StateError> {
        if !self.cache.contains_key(&id) {
            match codec::load::<Coin>(self.base.as_ref(), &keys::coin(id))? {
                Some(coin) => {
                    self.cache.insert(id, coin);
                }
                None => return Ok(None),
            }
        }
        Ok(self.cache.get_mut(&id))
    }

    fn coin_mut(&mut self, id: CoinId) -> Result<&mut Coin, StateError> {
        self.dirty.insert(id);
        self.coin(id)?.ok_or(StateError::CoinNotExists(id))
    }

    pub fn get(&mut self, id: CoinId) -> Result<Option<Coin>, StateError> {
        if id.is_base_coin() {
            return Ok(Some(Coin::base()));
        }
        Ok(self.coin(id)?.map(|coin| coin.clone()))
    }

    /// Like `get`, but a missing coin is an error.
    pub fn require(&mut self, id: CoinId) -> Result<Coin, StateError> {
        self.get(id)?.ok_or(StateError::CoinNotExists(id))
    }

    pub fn exists(&mut self, id: CoinId) -> Result<bool, StateError> {
        Ok(id.is_base_coin() || self.coin(id)?.is_some())
    }

    pub fn get_by_symbol(&mut self, symbol: &CoinSymbol) -> Result<Option<Coin>, StateError> {
        if *symbol == CoinSymbol::base() {
            return Ok(Some(Coin::base()));
        }
        let id = match self.symbols.get(symbol) {
            Some(id) => *id,
            None => match codec::load::<CoinId>(self.base.as_ref(), &keys::coin_symbol(symbol))? {
                Some(id) => {
                    self.symbols.insert(symbol.clone(), id);
                    id
                }
                None => return Ok(None),
            },
        };
        self.get(id)
    }

    pub fn create(&mut self, coin: Coin) -> Result<(), StateError> {
        if self.get_by_symbol(&coin.symbol)?.is_some() {
            return Err(StateError::CoinExists(coin.symbol));
        }
        self.symbols.insert(coin.symbol.clone(), coin.id);
        self.dirty_symbols.insert(coin.symbol.clone());
        self.dirty.insert(coin.id);
        tracing::debug!(id = %coin.id, symbol = %coin.symbol, "coin created");
        self.cache.insert(coin.id, coin);
        Ok(())
    }

    pub fn add_volume(&mut self, id: CoinId, amount: u128) -> Result<(), StateError> {
        if id.is_base_coin() {
            return Ok(());
        }
        let coin = self.coin_mut(id)?;
        coin.volume = coin
            .volume
            .checked_add(amount)
            .ok_or(StateError::Arithmetic("coin volume"))?;
        Ok(())
    }

    pub fn sub_volume(&mut self, id: CoinId, amount: u128) -> Result<(), StateError> {
        if id.is_base_coin() {
            return Ok(());
        }
        let coin = self.coin_mut(id)?;
        coin.volume = coin
            .volume
            .checked_sub(amount)
            .ok_or(StateError::Arithmetic("coin volume"))?;
        Ok(())
    }

    pub fn add_reserve(&mut self, id: CoinId, amount: u128) -> Result<(), StateError> {
        if id.is_base_coin() {
            return Ok(());
        }
        let coin = self.coin_mut(id)?;
        coin.reserve = coin
            .reserve
            .checked_add(amount)
            .ok_or(StateError::Arithmetic("coin reserve"))?;
        Ok(())
    }

    pub fn sub_reserve(&mut self, id: CoinId, amount: u128) -> Result<(), StateError> {
        if id.is_base_coin() {
            return Ok(());
        }
        let coin = self.coin_mut(id)?;
        coin.reserve = coin
            .reserve
            .checked_sub(amount)
            .ok_or(StateError::Arithmetic("coin reserve"))?;
        Ok(())
    }

    /// Every stored coin, ascending by id.
    pub fn all(&mut self) -> Result<Vec<Coin>, StateError> {
        for (key, value) in self.base.iterate_prefix(&[keys::COIN_PREFIX])? {
            let coin: Coin = codec::decode(&key, &value)?;
            self.cache.entry(coin.id).or_insert(coin);
        }
        Ok(self.cache.values().cloned().collect())
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        for id in &self.dirty {
            if let Some(coin) = self.cache.get(id) {
                batch.put(keys::coin(*id), codec::encode(coin)?);
            }
        }
        for symbol in &self.dirty_symbols {
            if let Some(id) = self.symbols.get(symbol) {
                batch.put(keys::coin_symbol(symbol), codec::encode(id)?);
            }
        }
        Ok(())
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.dirty.clear();
        self.dirty_symbols.clear();
    }
}
