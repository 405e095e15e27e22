//! Constant-product swap pricing.
//!
//! A pool holding `(reserve_in, reserve_out)` prices a trade so that
//! `reserve_in · reserve_out` never decreases. The fee
//! (`SWAP_FEE_PER_MILLE` thousandths) is taken from the input leg and stays
//! in the pool.

use primitive_types::U256;
use strata_types::params::SWAP_FEE_PER_MILLE;

use crate::error::SwapError;
use crate::fixed::to_u128;

const PER_MILLE: u128 = 1000;

/// Output received for selling `amount_in` into the pool.
pub fn calculate_buy_for_sell(
    reserve_in: u128,
    reserve_out: u128,
    amount_in: u128,
) -> Result<u128, SwapError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(SwapError::InsufficientLiquidity);
    }
    let with_fee = U256::from(amount_in) * U256::from(PER_MILLE - SWAP_FEE_PER_MILLE);
    let numerator = with_fee * U256::from(reserve_out);
    let denominator = U256::from(reserve_in) * U256::from(PER_MILLE) + with_fee;
    to_u128(numerator / denominator).ok_or(SwapError::InsufficientLiquidity)
}

/// Input needed to take `amount_out` out of the pool.
///
/// Fails with `InsufficientLiquidity` when `amount_out` would drain the
/// output reserve.
pub fn calculate_sell_for_buy(
    reserve_in: u128,
    reserve_out: u128,
    amount_out: u128,
) -> Result<u128, SwapError> {
    if reserve_in == 0 || amount_out >= reserve_out {
        return Err(SwapError::InsufficientLiquidity);
    }
    let numerator = U256::from(reserve_in) * U256::from(amount_out) * U256::from(PER_MILLE);
    let denominator =
        U256::from(reserve_out - amount_out) * U256::from(PER_MILLE - SWAP_FEE_PER_MILLE);
    let amount_in = numerator / denominator + U256::one();
    to_u128(amount_in).ok_or(SwapError::InsufficientLiquidity)
}

/// Check a priced swap against the caller's slippage guard.
pub fn check_swap(amount_out: u128, min_out: u128) -> Result<(), SwapError> {
    if amount_out == 0 {
        return Err(SwapError::InsufficientLiquidity);
    }
    if amount_out < min_out {
        return Err(SwapError::InsufficientOutputAmount {
            got: amount_out,
            min: min_out,
        });
    }
    Ok(())
}
