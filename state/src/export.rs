//! Genesis documents: exporting a committed state and importing it into a
//! fresh tree.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_types::params::{MAX_CRR, MAX_DELEGATORS_PER_CANDIDATE, MIN_CRR};
use strata_types::{Address, CoinId, CoinSymbol, Hash};

use crate::app::AppModel;
use crate::candidates::{Candidate, Stake};
use crate::coins::Coin;
use crate::frozen_funds::FrozenFund;
use crate::state::{State, ViewKind};
use crate::swap::Pool;
use crate::StateError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub app: AppModel,
    pub accounts: Vec<GenesisAccount>,
    pub coins: Vec<Coin>,
    pub candidates: Vec<GenesisCandidate>,
    pub frozen_funds: Vec<GenesisFrozenFund>,
    pub used_checks: Vec<Hash>,
    pub pools: Vec<Pool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: Address,
    pub nonce: u64,
    pub balances: Vec<GenesisBalance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub coin: CoinId,
    pub value: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCandidate {
    pub candidate: Candidate,
    pub stakes: Vec<Stake>,
    pub total_stake: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFrozenFund {
    pub height: u64,
    pub fund: FrozenFund,
}

impl GenesisState {
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string_pretty(self).map_err(|e| StateError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json).map_err(|e| StateError::InvalidGenesis(e.to_string()))
    }
}

fn invalid(reason: String) -> StateError {
    StateError::InvalidGenesis(reason)
}

impl State {
    /// Snapshot every sub-state into a genesis document.
    pub fn export(&mut self) -> Result<GenesisState, StateError> {
        let accounts = self
            .accounts
            .all()?
            .into_iter()
            .map(|(address, account)| GenesisAccount {
                address,
                nonce: account.nonce,
                balances: account
                    .balances
                    .into_iter()
                    .map(|(coin, value)| GenesisBalance { coin, value })
                    .collect(),
            })
            .collect();

        let candidates = self
            .candidates
            .export()?
            .into_iter()
            .map(|(candidate, stakes, total_stake)| GenesisCandidate {
                candidate,
                stakes,
                total_stake,
            })
            .collect();

        let frozen_funds = self
            .frozen_funds
            .all()?
            .into_iter()
            .map(|(height, fund)| GenesisFrozenFund { height, fund })
            .collect();

        Ok(GenesisState {
            app: self.app.export()?,
            accounts,
            coins: self.coins.all()?,
            candidates,
            frozen_funds,
            used_checks: self.checks.all()?,
            pools: self.swap.all()?,
        })
    }

    /// Load a genesis document into this deliver view and verify the supply
    /// invariants. Nothing is written until the next `commit`.
    pub fn import(&mut self, genesis: &GenesisState) -> Result<(), StateError> {
        if self.kind() != ViewKind::Deliver {
            return Err(StateError::ReadOnly);
        }
        self.app.import(genesis.app.clone());

        let mut ids = BTreeSet::new();
        for coin in &genesis.coins {
            if coin.id.is_base_coin() || !ids.insert(coin.id) {
                return Err(invalid(format!("duplicate or reserved coin id {}", coin.id)));
            }
            CoinSymbol::new(coin.symbol.as_str()).map_err(|e| invalid(e.to_string()))?;
            if !(MIN_CRR..=MAX_CRR).contains(&coin.crr) {
                return Err(invalid(format!("coin {} has crr {}", coin.symbol, coin.crr)));
            }
            if coin.volume > coin.max_supply {
                return Err(invalid(format!("coin {} exceeds its max supply", coin.symbol)));
            }
            if coin.id.0 > genesis.app.coins_count {
                return Err(invalid(format!("coin id {} above coin counter", coin.id)));
            }
            self.coins.create(coin.clone())?;
        }

        for account in &genesis.accounts {
            self.accounts.set_nonce(&account.address, account.nonce)?;
            for balance in &account.balances {
                self.require_coin(balance.coin)?;
                self.accounts
                    .add_balance(&account.address, balance.coin, balance.value)?;
            }
        }

        for entry in &genesis.candidates {
            let candidate = &entry.candidate;
            if candidate.tm_address != strata_crypto::tm_address(&candidate.pubkey) {
                return Err(invalid(format!(
                    "candidate {} has a mismatched validator address",
                    candidate.pubkey
                )));
            }
            if entry.stakes.len() > MAX_DELEGATORS_PER_CANDIDATE {
                return Err(invalid(format!(
                    "candidate {} has {} stakes",
                    candidate.pubkey,
                    entry.stakes.len()
                )));
            }
            for stake in entry.stakes.iter().chain(&candidate.updates) {
                self.require_coin(stake.coin)?;
            }
            self.candidates
                .import(candidate.clone(), entry.stakes.clone())?;
        }

        for entry in &genesis.frozen_funds {
            let fund = &entry.fund;
            self.require_coin(fund.coin)?;
            self.frozen_funds.add_frozen_fund(
                entry.height,
                fund.owner,
                fund.candidate,
                fund.coin,
                fund.value,
            )?;
        }

        for hash in &genesis.used_checks {
            self.checks.use_check(*hash);
        }

        for pool in &genesis.pools {
            self.require_coin(pool.coin0)?;
            self.require_coin(pool.coin1)?;
            self.swap
                .create_pair(pool.coin0, pool.reserve0, pool.coin1, pool.reserve1)?;
        }

        self.check_invariants()?;
        tracing::info!(
            coins = genesis.coins.len(),
            accounts = genesis.accounts.len(),
            candidates = genesis.candidates.len(),
            "genesis imported"
        );
        Ok(())
    }

    fn require_coin(&mut self, coin: CoinId) -> Result<(), StateError> {
        if self.coins.exists(coin)? {
            Ok(())
        } else {
            Err(invalid(format!("unknown coin {coin}")))
        }
    }

    /// Every custom coin's volume must equal what is accounted for across
    /// balances, stakes, pending delegations, frozen funds and pool reserves.
    pub fn check_invariants(&mut self) -> Result<(), StateError> {
        let mut accounted: BTreeMap<CoinId, u128> = BTreeMap::new();
        let mut account = |coin: CoinId, value: u128| -> Result<(), StateError> {
            let total = accounted.entry(coin).or_insert(0);
            *total = total
                .checked_add(value)
                .ok_or(StateError::Arithmetic("accounted supply"))?;
            Ok(())
        };

        for (_, acc) in self.accounts.all()? {
            for (coin, value) in acc.balances {
                account(coin, value)?;
            }
        }
        for (candidate, stakes, _) in self.candidates.export()? {
            for stake in stakes.iter().chain(&candidate.updates) {
                account(stake.coin, stake.value)?;
            }
        }
        for (_, fund) in self.frozen_funds.all()? {
            account(fund.coin, fund.value)?;
        }
        for pool in self.swap.all()? {
            account(pool.coin0, pool.reserve0)?;
            account(pool.coin1, pool.reserve1)?;
        }

        for coin in self.coins.all()? {
            let total = accounted.get(&coin.id).copied().unwrap_or(0);
            if total != coin.volume {
                tracing::error!(coin = %coin.id, volume = coin.volume, accounted = total, "supply invariant violated");
                return Err(StateError::InvariantViolation {
                    coin: coin.id,
                    volume: coin.volume,
                    accounted: total,
                });
            }
        }
        Ok(())
    }
}
