//! Persisted candidate and stake records.

use serde::{Deserialize, Serialize};
use strata_types::{Address, CoinId, PublicKey, TmAddress};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Offline,
    Online,
}

/// A delegated position, or a pending delegation waiting for the next
/// stake recalculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub owner: Address,
    pub coin: CoinId,
    pub value: u128,
    /// Worth in base coin at the last recalculation.
    pub bip_value: u128,
}

impl Stake {
    pub fn new(owner: Address, coin: CoinId, value: u128) -> Self {
        Self {
            owner,
            coin,
            value,
            bip_value: 0,
        }
    }

    /// Ordering key of the stake list: ascending bip value, then owner, then coin.
    pub(crate) fn sort_key(&self) -> (u128, Address, CoinId) {
        (self.bip_value, self.owner, self.coin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub pubkey: PublicKey,
    pub owner: Address,
    pub reward_address: Address,
    /// Validator commission, percent.
    pub commission: u32,
    pub status: CandidateStatus,
    pub tm_address: TmAddress,
    pub created_at_block: u64,
    /// Delegations received since the last recalculation, in arrival order.
    pub updates: Vec<Stake>,
}

impl Candidate {
    pub fn is_online(&self) -> bool {
        self.status == CandidateStatus::Online
    }
}

/// Stake list header: number of stakes and the slot of the largest one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StakeHeader {
    pub count: u32,
    pub tail: Option<u32>,
}

/// One stored stake; `prev_index` links to the next smaller stake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StakeNode {
    pub stake: Stake,
    pub prev_index: Option<u32>,
}
