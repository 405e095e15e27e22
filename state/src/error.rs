use strata_formula::{CurveError, SwapError};
use strata_store::StoreError;
use strata_types::{Address, CoinId, CoinSymbol, PublicKey};
use thiserror::Error;

/// Errors raised by the state container and its sub-states.
///
/// `Store`, `Corrupted` and `Encode` mean the view can no longer be trusted;
/// the remaining variants are economic rule violations a transaction handler
/// may turn into a rejection.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("corrupted state at key {key}: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("failed to encode state: {0}")]
    Encode(String),

    #[error("state view is read-only")]
    ReadOnly,

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error("insufficient balance of {address} in coin {coin}: need {needed}, available {available}")]
    InsufficientBalance {
        address: Address,
        coin: CoinId,
        needed: u128,
        available: u128,
    },

    #[error("coin {0} does not exist")]
    CoinNotExists(CoinId),

    #[error("coin symbol {0} already exists")]
    CoinExists(CoinSymbol),

    #[error("swap pool for pair {0}-{1} already exists")]
    PairExists(CoinId, CoinId),

    #[error("candidate {0} does not exist")]
    CandidateNotFound(PublicKey),

    #[error("candidate {0} already exists")]
    CandidateExists(PublicKey),

    #[error("stake of {owner} in coin {coin} at candidate {pubkey} not found")]
    StakeNotFound {
        pubkey: PublicKey,
        owner: Address,
        coin: CoinId,
    },

    #[error("insufficient stake: need {needed}, staked {available}")]
    InsufficientStake { needed: u128, available: u128 },

    #[error("arithmetic overflow or underflow in {0}")]
    Arithmetic(&'static str),

    #[error("invariant violated for coin {coin}: volume {volume}, accounted {accounted}")]
    InvariantViolation {
        coin: CoinId,
        volume: u128,
        accounted: u128,
    },

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),
}
