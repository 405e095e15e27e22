//! Account nonces and multi-coin balances.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::{Address, CoinId};

use crate::codec;
use crate::StateError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Nonce of the last applied transaction; the next one must be `nonce + 1`.
    pub nonce: u64,
    /// Non-zero balances only.
    pub balances: BTreeMap<CoinId, u128>,
}

impl Account {
    pub fn balance(&self, coin: CoinId) -> u128 {
        self.balances.get(&coin).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balances.is_empty()
    }
}

pub struct Accounts {
    base: Arc<dyn ImmutableTree>,
    cache: BTreeMap<Address, Account>,
    dirty: BTreeSet<Address>,
}

impl Accounts {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            cache: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn account(&mut self, address: &Address) -> Result<&mut Account, StateError> {
        if !self.cache.contains_key(address) {
            let loaded = codec::load(self.base.as_ref(), &keys::account(address))?;
            self.cache.insert(*address, loaded.unwrap_or_default());
        }
        Ok(self.cache.entry(*address).or_default())
    }

    fn account_mut(&mut self, address: &Address) -> Result<&mut Account, StateError> {
        self.dirty.insert(*address);
        self.account(address)
    }

    pub fn get_account(&mut self, address: &Address) -> Result<Account, StateError> {
        Ok(self.account(address)?.clone())
    }

    pub fn get_nonce(&mut self, address: &Address) -> Result<u64, StateError> {
        Ok(self.account(address)?.nonce)
    }

    pub fn set_nonce(&mut self, address: &Address, nonce: u64) -> Result<(), StateError> {
        self.account_mut(address)?.nonce = nonce;
        Ok(())
    }

    pub fn get_balance(&mut self, address: &Address, coin: CoinId) -> Result<u128, StateError> {
        Ok(self.account(address)?.balance(coin))
    }

    pub fn get_balances(&mut self, address: &Address) -> Result<BTreeMap<CoinId, u128>, StateError> {
        Ok(self.account(address)?.balances.clone())
    }

    pub fn add_balance(
        &mut self,
        address: &Address,
        coin: CoinId,
        amount: u128,
    ) -> Result<(), StateError> {
        if amount == 0 {
            return Ok(());
        }
        let account = self.account_mut(address)?;
        let balance = account.balances.entry(coin).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(StateError::Arithmetic("account balance"))?;
        Ok(())
    }

    pub fn sub_balance(
        &mut self,
        address: &Address,
        coin: CoinId,
        amount: u128,
    ) -> Result<(), StateError> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.account(address)?.balance(coin);
        let remaining = available
            .checked_sub(amount)
            .ok_or(StateError::InsufficientBalance {
                address: *address,
                coin,
                needed: amount,
                available,
            })?;
        let account = self.account_mut(address)?;
        if remaining == 0 {
            account.balances.remove(&coin);
        } else {
            account.balances.insert(coin, remaining);
        }
        Ok(())
    }

    /// Every non-empty account, ascending by address.
    pub fn all(&mut self) -> Result<Vec<(Address, Account)>, StateError> {
        for (key, value) in self.base.iterate_prefix(&[keys::ACCOUNT_PREFIX])? {
            let raw: [u8; 20] = key
                .get(1..)
                .and_then(|rest| rest.try_into().ok())
                .ok_or_else(|| codec::corrupted(&key, "malformed account key"))?;
            let address = Address::new(raw);
            if !self.cache.contains_key(&address) {
                let account = codec::decode(&key, &value)?;
                self.cache.insert(address, account);
            }
        }
        Ok(self
            .cache
            .iter()
            .filter(|(_, account)| !account.is_empty())
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        for address in &self.dirty {
            let key = keys::account(address);
            match self.cache.get(address) {
                Some(account) if !account.is_empty() => batch.put(key, codec::encode(account)?),
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
