//! Validator candidates and their delegated stakes.
//!
//! Delegations are buffered per candidate and applied once per block by
//! `recalculate_stakes`, which revalues every stake through the bonding
//! curve, enforces the per-candidate capacity and keeps each list ordered.

mod model;
mod stakes;

pub use model::{Candidate, CandidateStatus, Stake};

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::params::{MAX_DELEGATORS_PER_CANDIDATE, UNBOND_PERIOD};
use strata_types::{Address, CoinId, PublicKey, TmAddress};

use crate::bus::Bus;
use crate::coins::Coins;
use crate::slash::{self, Slash};
use crate::{codec, StateError};
use stakes::{admit, Admission, CoinPrices, StakeList};

pub struct Candidates {
    base: Arc<dyn ImmutableTree>,
    list: Option<BTreeMap<PublicKey, Candidate>>,
    stakes: BTreeMap<PublicKey, StakeList>,
    dirty: bool,
}

impl Candidates {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            list: None,
            stakes: BTreeMap::new(),
            dirty: false,
        }
    }

    fn list(&mut self) -> Result<&mut BTreeMap<PublicKey, Candidate>, StateError> {
        let list = match self.list.take() {
            Some(list) => list,
            None => {
                let stored: Vec<Candidate> =
                    codec::load(self.base.as_ref(), &keys::candidates_root())?.unwrap_or_default();
                stored.into_iter().map(|c| (c.pubkey, c)).collect()
            }
        };
        Ok(self.list.insert(list))
    }

    fn candidate_mut(&mut self, pubkey: &PublicKey) -> Result<&mut Candidate, StateError> {
        self.dirty = true;
        self.list()?
            .get_mut(pubkey)
            .ok_or(StateError::CandidateNotFound(*pubkey))
    }

    fn stake_list(&mut self, pubkey: &PublicKey) -> Result<&mut StakeList, StateError> {
        if !self.stakes.contains_key(pubkey) {
            if !self.exists(pubkey)? {
                return Err(StateError::CandidateNotFound(*pubkey));
            }
            let loaded = StakeList::load(self.base.as_ref(), pubkey)?;
            self.stakes.insert(*pubkey, loaded);
        }
        self.stakes
            .get_mut(pubkey)
            .ok_or(StateError::CandidateNotFound(*pubkey))
    }

    /// Load every candidate's stake list; returns the candidate keys in order.
    fn load_all_stakes(&mut self) -> Result<Vec<PublicKey>, StateError> {
        let pubkeys: Vec<PublicKey> = self.list()?.keys().copied().collect();
        for pubkey in &pubkeys {
            self.stake_list(pubkey)?;
        }
        Ok(pubkeys)
    }

    /// Price every delegated coin at its total delegated amount (stakes plus
    /// pending updates), optionally counting one more prospective stake.
    fn prices(
        &mut self,
        coins: &mut Coins,
        prospective: Option<(CoinId, u128)>,
    ) -> Result<CoinPrices, StateError> {
        self.load_all_stakes()?;
        let mut delegated: Vec<(CoinId, u128)> = self
            .list()?
            .values()
            .flat_map(|c| c.updates.iter().map(|s| (s.coin, s.value)))
            .collect();
        delegated.extend(
            self.stakes
                .values()
                .flat_map(|list| list.stakes.iter().map(|s| (s.coin, s.value))),
        );
        delegated.extend(prospective);

        let mut totals: BTreeMap<CoinId, u128> = BTreeMap::new();
        for (coin, value) in delegated {
            let total = totals.entry(coin).or_insert(0);
            *total = total
                .checked_add(value)
                .ok_or(StateError::Arithmetic("delegated total"))?;
        }

        let mut prices = CoinPrices::default();
        for (coin, total) in totals {
            if coin.is_base_coin() || total == 0 {
                continue;
            }
            let ret = coins.require(coin)?.sale_return(total)?;
            prices.insert(coin, ret, total);
        }
        Ok(prices)
    }

    pub fn exists(&mut self, pubkey: &PublicKey) -> Result<bool, StateError> {
        Ok(self.list()?.contains_key(pubkey))
    }

    pub fn count(&mut self) -> Result<usize, StateError> {
        Ok(self.list()?.len())
    }

    pub fn get_candidate(&mut self, pubkey: &PublicKey) -> Result<Option<Candidate>, StateError> {
        Ok(self.list()?.get(pubkey).cloned())
    }

    /// All candidates, ascending by public key.
    pub fn get_candidates(&mut self) -> Result<Vec<Candidate>, StateError> {
        Ok(self.list()?.values().cloned().collect())
    }

    pub fn get_candidate_by_tm_address(
        &mut self,
        address: &TmAddress,
    ) -> Result<Option<Candidate>, StateError> {
        Ok(self
            .list()?
            .values()
            .find(|c| c.tm_address == *address)
            .cloned())
    }

    /// Register a new, offline candidate.
    pub fn create(
        &mut self,
        owner: Address,
        reward_address: Address,
        pubkey: PublicKey,
        commission: u32,
        height: u64,
    ) -> Result<(), StateError> {
        if self.exists(&pubkey)? {
            return Err(StateError::CandidateExists(pubkey));
        }
        let candidate = Candidate {
            pubkey,
            owner,
            reward_address,
            commission,
            status: CandidateStatus::Offline,
            tm_address: strata_crypto::tm_address(&pubkey),
            created_at_block: height,
            updates: Vec::new(),
        };
        self.list()?.insert(pubkey, candidate);
        self.stakes.insert(pubkey, StakeList::empty());
        self.dirty = true;
        tracing::debug!(candidate = %pubkey, %owner, "candidate declared");
        Ok(())
    }

    pub fn edit(
        &mut self,
        pubkey: &PublicKey,
        owner: Address,
        reward_address: Address,
    ) -> Result<(), StateError> {
        let candidate = self.candidate_mut(pubkey)?;
        candidate.owner = owner;
        candidate.reward_address = reward_address;
        Ok(())
    }

    pub fn set_online(&mut self, pubkey: &PublicKey) -> Result<(), StateError> {
        self.candidate_mut(pubkey)?.status = CandidateStatus::Online;
        Ok(())
    }

    pub fn set_offline(&mut self, pubkey: &PublicKey) -> Result<(), StateError> {
        self.candidate_mut(pubkey)?.status = CandidateStatus::Offline;
        Ok(())
    }

    /// Queue a delegation; it becomes a stake at the next recalculation.
    pub fn delegate(
        &mut self,
        owner: Address,
        pubkey: &PublicKey,
        coin: CoinId,
        value: u128,
    ) -> Result<(), StateError> {
        self.candidate_mut(pubkey)?
            .updates
            .push(Stake::new(owner, coin, value));
        Ok(())
    }

    /// Remove `value` from a stake. The stake disappears at the next
    /// recalculation if it reaches zero.
    pub fn sub_stake(
        &mut self,
        owner: &Address,
        pubkey: &PublicKey,
        coin: CoinId,
        value: u128,
    ) -> Result<(), StateError> {
        let list = self.stake_list(pubkey)?;
        let stake = list
            .find_mut(owner, coin)
            .ok_or(StateError::StakeNotFound {
                pubkey: *pubkey,
                owner: *owner,
                coin,
            })?;
        stake.value = stake
            .value
            .checked_sub(value)
            .ok_or(StateError::InsufficientStake {
                needed: value,
                available: stake.value,
            })?;
        list.dirty = true;
        Ok(())
    }

    /// Stakes ascending by bip value.
    pub fn get_stakes(&mut self, pubkey: &PublicKey) -> Result<Vec<Stake>, StateError> {
        Ok(self.stake_list(pubkey)?.stakes.clone())
    }

    pub fn get_stake_of_address(
        &mut self,
        pubkey: &PublicKey,
        owner: &Address,
        coin: CoinId,
    ) -> Result<Option<Stake>, StateError> {
        Ok(self.stake_list(pubkey)?.find(owner, coin).cloned())
    }

    pub fn get_total_stake(&mut self, pubkey: &PublicKey) -> Result<u128, StateError> {
        Ok(self.stake_list(pubkey)?.total)
    }

    pub fn stakes_count(&mut self, pubkey: &PublicKey) -> Result<usize, StateError> {
        Ok(self.stake_list(pubkey)?.stakes.len())
    }

    /// Whether a delegation of `amount` of `coin` by `owner` would be kept by
    /// the candidate's stake list. Does not mutate state.
    pub fn is_delegator_stake_sufficient(
        &mut self,
        owner: &Address,
        pubkey: &PublicKey,
        coin: CoinId,
        amount: u128,
        coins: &mut Coins,
    ) -> Result<bool, StateError> {
        let list = self.stake_list(pubkey)?;
        if list.stakes.len() < MAX_DELEGATORS_PER_CANDIDATE || list.find(owner, coin).is_some() {
            return Ok(true);
        }
        let smallest = list.stakes.iter().map(|s| s.bip_value).min().unwrap_or(0);
        let value = self.prices(coins, Some((coin, amount)))?.value(coin, amount);
        Ok(value > smallest)
    }

    /// Whether a new candidate with a self-stake of `amount` of `coin` would
    /// outrank at least one existing candidate when `limit` slots exist.
    pub fn is_new_candidate_stake_sufficient(
        &mut self,
        coin: CoinId,
        amount: u128,
        limit: usize,
        coins: &mut Coins,
    ) -> Result<bool, StateError> {
        let pubkeys = self.load_all_stakes()?;
        if pubkeys.len() < limit {
            return Ok(true);
        }
        let value = self.prices(coins, Some((coin, amount)))?.value(coin, amount);
        Ok(self.stakes.values().any(|list| list.total < value))
    }

    /// Apply every pending delegation and revalue all stakes.
    ///
    /// Returns the stakes refunded to their owners: evicted minimum stakes
    /// and delegations rejected by full lists.
    pub fn recalculate_stakes(&mut self, bus: &mut Bus<'_>) -> Result<Vec<Stake>, StateError> {
        let pubkeys = self.load_all_stakes()?;
        let prices = self.prices(bus.coins, None)?;
        let mut refunds = Vec::new();

        for pubkey in pubkeys {
            let updates = match self.list()?.get_mut(&pubkey) {
                Some(candidate) => std::mem::take(&mut candidate.updates),
                None => continue,
            };
            if !updates.is_empty() {
                self.dirty = true;
            }

            let list = self.stake_list(&pubkey)?;
            let before = (list.stakes.clone(), list.total);
            for stake in &mut list.stakes {
                stake.bip_value = prices.value(stake.coin, stake.value);
            }
            list.stakes.retain(|s| s.value > 0);

            for update in updates {
                match admit(&mut list.stakes, update, &prices, MAX_DELEGATORS_PER_CANDIDATE) {
                    Admission::Merged | Admission::Inserted => {}
                    Admission::Evicted(stake) | Admission::Rejected(stake) => {
                        tracing::debug!(
                            candidate = %pubkey,
                            owner = %stake.owner,
                            coin = %stake.coin,
                            value = stake.value,
                            "stake refunded"
                        );
                        bus.accounts.add_balance(&stake.owner, stake.coin, stake.value)?;
                        refunds.push(stake);
                    }
                }
            }

            list.normalize()?;
            if list.stakes != before.0 || list.total != before.1 {
                list.dirty = true;
            }
        }
        Ok(refunds)
    }

    /// Slash a byzantine validator: 5% of every stake is burned, the rest is
    /// frozen until `height + UNBOND_PERIOD`, and the candidate goes offline.
    /// Frozen funds already waiting on this candidate are slashed as well.
    pub fn punish_byzantine(
        &mut self,
        height: u64,
        address: &TmAddress,
        bus: &mut Bus<'_>,
    ) -> Result<Vec<Slash>, StateError> {
        let Some(candidate) = self.get_candidate_by_tm_address(address)? else {
            tracing::warn!(validator = %address, "evidence for unknown validator ignored");
            return Ok(Vec::new());
        };
        let pubkey = candidate.pubkey;
        let release_height = height.saturating_add(UNBOND_PERIOD);

        let mut slashes = bus.frozen_funds.punish_frozen_funds_with_candidate(
            height,
            release_height,
            &pubkey,
            bus.coins,
            bus.app,
        )?;

        let list = self.stake_list(&pubkey)?;
        let stakes = std::mem::take(&mut list.stakes);
        list.total = 0;
        list.dirty = true;

        for stake in stakes {
            let (kept, slashed) = slash::split(stake.value);
            slash::burn(bus.coins, bus.app, stake.coin, slashed)?;
            bus.frozen_funds
                .add_frozen_fund(release_height, stake.owner, pubkey, stake.coin, kept)?;
            slashes.push(Slash {
                owner: stake.owner,
                coin: stake.coin,
                slashed,
                kept,
            });
        }

        self.set_offline(&pubkey)?;
        tracing::info!(
            candidate = %pubkey,
            height,
            slashed_positions = slashes.len(),
            "byzantine validator punished"
        );
        Ok(slashes)
    }

    /// Candidates with their stakes and total stake, ascending by key.
    pub fn export(&mut self) -> Result<Vec<(Candidate, Vec<Stake>, u128)>, StateError> {
        let pubkeys = self.load_all_stakes()?;
        let mut out = Vec::with_capacity(pubkeys.len());
        for pubkey in pubkeys {
            let candidate = self
                .get_candidate(&pubkey)?
                .ok_or(StateError::CandidateNotFound(pubkey))?;
            let list = self.stake_list(&pubkey)?;
            out.push((candidate, list.stakes.clone(), list.total));
        }
        Ok(out)
    }

    /// Install a candidate with an already-valued stake list.
    pub(crate) fn import(&mut self, candidate: Candidate, stakes: Vec<Stake>) -> Result<(), StateError> {
        let pubkey = candidate.pubkey;
        if self.exists(&pubkey)? {
            return Err(StateError::CandidateExists(pubkey));
        }
        if stakes.len() > MAX_DELEGATORS_PER_CANDIDATE {
            return Err(StateError::InvalidGenesis(format!(
                "candidate {pubkey} has {} stakes",
                stakes.len()
            )));
        }
        let mut list = StakeList::empty();
        list.stakes = stakes;
        list.normalize()?;
        list.dirty = true;
        self.list()?.insert(pubkey, candidate);
        self.stakes.insert(pubkey, list);
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        if let (true, Some(list)) = (self.dirty, &self.list) {
            let stored: Vec<&Candidate> = list.values().collect();
            batch.put(keys::candidates_root(), codec::encode(&stored)?);
        }
        for (pubkey, stakes) in &self.stakes {
            stakes.flush(pubkey, batch)?;
        }
        Ok(())
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.dirty = false;
        for list in self.stakes.values_mut() {
            list.rebase();
        }
    }
}
