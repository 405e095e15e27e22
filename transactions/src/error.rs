use serde_json::json;
use strata_formula::{CurveError, SwapError};
use strata_state::StateError;
use thiserror::Error;

use crate::code::Code;
use crate::response::Response;

/// Failure of a transaction or a query.
///
/// `Rejected` is an ordinary outcome: the response goes back to the caller
/// and the state is untouched. `State` and `Encode` mean the state view
/// itself failed and must not be used further.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("rejected with code {}: {}", .0.code, .0.log)]
    Rejected(Box<Response>),

    #[error(transparent)]
    State(StateError),

    #[error("failed to encode: {0}")]
    Encode(String),
}

impl TxError {
    pub fn reject(code: Code, log: impl Into<String>, info: serde_json::Value) -> Self {
        Self::Rejected(Box::new(Response::reject(code, log, info)))
    }

    pub fn code(&self) -> Option<Code> {
        match self {
            Self::Rejected(resp) => Some(resp.code),
            _ => None,
        }
    }
}

impl From<CurveError> for TxError {
    fn from(e: CurveError) -> Self {
        let log = e.to_string();
        match e {
            CurveError::ReserveUnderflow {
                requested,
                available,
            } => Self::reject(
                Code::CoinReserveUnderflow,
                log,
                json!({ "requested": requested.to_string(), "available": available.to_string() }),
            ),
            CurveError::SupplyOverflow | CurveError::Overflow => {
                Self::reject(Code::CoinSupplyOverflow, log, json!({}))
            }
            CurveError::EmptyCurve => Self::reject(Code::CoinHasNotReserve, log, json!({})),
            CurveError::InvalidCrr(crr) => Self::reject(Code::WrongCrr, log, json!({ "crr": crr })),
        }
    }
}

impl From<SwapError> for TxError {
    fn from(e: SwapError) -> Self {
        let log = e.to_string();
        match e {
            SwapError::PairNotExists(a, b) => Self::reject(
                Code::PairNotExists,
                log,
                json!({ "coin0": a.to_string(), "coin1": b.to_string() }),
            ),
            SwapError::InsufficientOutputAmount { got, min } => Self::reject(
                Code::InsufficientOutputAmount,
                log,
                json!({ "got": got.to_string(), "min": min.to_string() }),
            ),
            SwapError::InsufficientInputAmount { need, max } => Self::reject(
                Code::InsufficientInputAmount,
                log,
                json!({ "need": need.to_string(), "max": max.to_string() }),
            ),
            SwapError::InsufficientLiquidity => {
                Self::reject(Code::InsufficientLiquidity, log, json!({}))
            }
        }
    }
}

impl From<StateError> for TxError {
    fn from(e: StateError) -> Self {
        let log = e.to_string();
        match e {
            StateError::Curve(e) => e.into(),
            StateError::Swap(e) => e.into(),
            StateError::InsufficientBalance {
                address,
                coin,
                needed,
                available,
            } => Self::reject(
                Code::InsufficientFunds,
                log,
                json!({
                    "sender": address.to_string(),
                    "coin": coin.to_string(),
                    "needed": needed.to_string(),
                    "available": available.to_string(),
                }),
            ),
            StateError::CoinNotExists(coin) => {
                Self::reject(Code::CoinNotExists, log, json!({ "coin": coin.to_string() }))
            }
            StateError::CoinExists(symbol) => Self::reject(
                Code::CoinAlreadyExists,
                log,
                json!({ "symbol": symbol.to_string() }),
            ),
            StateError::PairExists(a, b) => Self::reject(
                Code::PairAlreadyExists,
                log,
                json!({ "coin0": a.to_string(), "coin1": b.to_string() }),
            ),
            StateError::CandidateNotFound(pubkey) => Self::reject(
                Code::CandidateNotFound,
                log,
                json!({ "public_key": pubkey.to_string() }),
            ),
            StateError::CandidateExists(pubkey) => Self::reject(
                Code::CandidateExists,
                log,
                json!({ "public_key": pubkey.to_string() }),
            ),
            StateError::StakeNotFound {
                pubkey,
                owner,
                coin,
            } => Self::reject(
                Code::StakeNotFound,
                log,
                json!({
                    "public_key": pubkey.to_string(),
                    "owner": owner.to_string(),
                    "coin": coin.to_string(),
                }),
            ),
            StateError::InsufficientStake { needed, available } => Self::reject(
                Code::InsufficientStake,
                log,
                json!({ "needed": needed.to_string(), "available": available.to_string() }),
            ),
            other => Self::State(other),
        }
    }
}
