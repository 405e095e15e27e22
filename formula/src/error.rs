//! Pricing errors.

use strata_types::CoinId;
use thiserror::Error;

/// Errors from the bonding curve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("reserve underflow: requested {requested}, available {available}")]
    ReserveUnderflow { requested: u128, available: u128 },

    #[error("coin supply overflow")]
    SupplyOverflow,

    #[error("crr {0} is outside 1..=100")]
    InvalidCrr(u32),

    #[error("curve has zero volume or zero reserve")]
    EmptyCurve,

    #[error("arithmetic overflow in curve computation")]
    Overflow,
}

/// Errors from the swap pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("swap pool for pair {0}-{1} does not exist")]
    PairNotExists(CoinId, CoinId),

    #[error("insufficient output amount: got {got}, minimum {min}")]
    InsufficientOutputAmount { got: u128, min: u128 },

    #[error("insufficient input amount: need {need}, maximum {max}")]
    InsufficientInputAmount { need: u128, max: u128 },

    #[error("insufficient liquidity in swap pool")]
    InsufficientLiquidity,
}
