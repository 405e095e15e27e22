//! Constant-reserve-ratio bonding curve.
//!
//! A coin with supply `volume`, base-coin `reserve` and reserve ratio
//! `c = crr / 100` has spot price `reserve / (volume · c)`. Selling `x` coins
//! returns `reserve · (1 − (1 − x / volume)^(1/c))`; depositing `d` base
//! coins mints `volume · ((1 + d / reserve)^c − 1)`. The two are mutual
//! inverses, and `sale_amount` / `buy_deposit` invert them for a wanted output.
//!
//! Amounts a caller receives round down, amounts a caller pays round up.
//! `crr == 100` is a linear curve and is computed exactly.

use primitive_types::U256;

use crate::error::CurveError;
use crate::fixed::{self, mul_div_ceil, mul_div_floor, mul_frac_ceil, mul_frac_floor};

const FULL_CRR: u32 = 100;

fn validate(volume: u128, reserve: u128, crr: u32) -> Result<(), CurveError> {
    if crr == 0 || crr > FULL_CRR {
        return Err(CurveError::InvalidCrr(crr));
    }
    if volume == 0 || reserve == 0 {
        return Err(CurveError::EmptyCurve);
    }
    Ok(())
}

/// Base coin received for selling `amount` coins.
pub fn sale_return(volume: u128, reserve: u128, crr: u32, amount: u128) -> Result<u128, CurveError> {
    if amount == 0 {
        return Ok(0);
    }
    validate(volume, reserve, crr)?;
    if amount > volume {
        return Err(CurveError::ReserveUnderflow {
            requested: amount,
            available: volume,
        });
    }
    if amount == volume {
        return Ok(reserve);
    }
    if crr == FULL_CRR {
        return mul_div_floor(reserve, amount, volume).ok_or(CurveError::Overflow);
    }

    let remaining = fixed::pow_ratio(
        U256::from(volume - amount),
        U256::from(volume),
        FULL_CRR,
        crr,
    )
    .ok_or(CurveError::Overflow)?;
    let sold = fixed::one().saturating_sub(remaining);
    let ret = mul_frac_floor(reserve, sold).ok_or(CurveError::Overflow)?;
    Ok(ret.min(reserve))
}

/// Coins minted for a base-coin `deposit`.
pub fn purchase_return(
    volume: u128,
    reserve: u128,
    crr: u32,
    deposit: u128,
) -> Result<u128, CurveError> {
    if deposit == 0 {
        return Ok(0);
    }
    validate(volume, reserve, crr)?;
    if crr == FULL_CRR {
        return mul_div_floor(volume, deposit, reserve).ok_or(CurveError::SupplyOverflow);
    }

    let growth = fixed::pow_ratio(
        U256::from(reserve) + U256::from(deposit),
        U256::from(reserve),
        crr,
        FULL_CRR,
    )
    .ok_or(CurveError::SupplyOverflow)?;
    let minted = growth.saturating_sub(fixed::one());
    mul_frac_floor(volume, minted).ok_or(CurveError::SupplyOverflow)
}

/// Coins that must be sold to receive `want` base coin.
pub fn sale_amount(volume: u128, reserve: u128, crr: u32, want: u128) -> Result<u128, CurveError> {
    if want == 0 {
        return Ok(0);
    }
    validate(volume, reserve, crr)?;
    if want > reserve {
        return Err(CurveError::ReserveUnderflow {
            requested: want,
            available: reserve,
        });
    }
    if want == reserve {
        return Ok(volume);
    }
    if crr == FULL_CRR {
        return mul_div_ceil(volume, want, reserve).ok_or(CurveError::Overflow);
    }

    let remaining = fixed::pow_ratio(
        U256::from(reserve - want),
        U256::from(reserve),
        crr,
        FULL_CRR,
    )
    .ok_or(CurveError::Overflow)?;
    let sold = fixed::one().saturating_sub(remaining);
    let amount = mul_frac_ceil(volume, sold).ok_or(CurveError::Overflow)?;
    Ok(amount.min(volume))
}

/// Base coin that must be deposited to mint `want` coins.
pub fn buy_deposit(volume: u128, reserve: u128, crr: u32, want: u128) -> Result<u128, CurveError> {
    if want == 0 {
        return Ok(0);
    }
    validate(volume, reserve, crr)?;
    if crr == FULL_CRR {
        return mul_div_ceil(reserve, want, volume).ok_or(CurveError::Overflow);
    }

    let growth = fixed::pow_ratio(
        U256::from(volume) + U256::from(want),
        U256::from(volume),
        FULL_CRR,
        crr,
    )
    .ok_or(CurveError::Overflow)?;
    let factor = growth.saturating_sub(fixed::one());
    mul_frac_ceil(reserve, factor).ok_or(CurveError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::bip_to_pip;

    fn assert_close(actual: u128, expected: u128, tolerance: u128) {
        let diff = actual.abs_diff(expected);
        assert!(
            diff <= tolerance,
            "expected {expected} within {tolerance}, got {actual} (diff {diff})"
        );
    }

    #[test]
    fn linear_curve_is_exact() {
        assert_eq!(sale_return(100_000, 100_000, 100, 1000).unwrap(), 1000);
        assert_eq!(purchase_return(100_000, 100_000, 100, 1000).unwrap(), 1000);
        assert_eq!(sale_amount(100_000, 100_000, 100, 1000).unwrap(), 1000);
        assert_eq!(buy_deposit(100_000, 100_000, 100, 1000).unwrap(), 1000);
    }

    #[test]
    fn linear_curve_rounds_against_the_caller() {
        // price 1/3 base per coin
        assert_eq!(sale_return(300, 100, 100, 10).unwrap(), 3);
        assert_eq!(sale_amount(300, 100, 100, 3).unwrap(), 9);
        assert_eq!(sale_amount(300, 100, 100, 4).unwrap(), 12);
        assert_eq!(buy_deposit(300, 100, 100, 10).unwrap(), 4);
    }

    #[test]
    fn half_reserve_sale() {
        // 500k reserve, 1M supply, c = 0.5: selling 1% returns 500k·(1 − 0.99²) = 9950.
        let volume = bip_to_pip(1_000_000);
        let reserve = bip_to_pip(500_000);
        let ret = sale_return(volume, reserve, 50, bip_to_pip(10_000)).unwrap();
        assert_close(ret, bip_to_pip(9_950), 1_000_000);
        assert!(ret <= bip_to_pip(9_950));
    }

    #[test]
    fn half_reserve_purchase() {
        // depositing 21% of the reserve grows supply by sqrt(1.21) − 1 = 10%.
        let volume = bip_to_pip(1_000_000);
        let reserve = bip_to_pip(500_000);
        let minted = purchase_return(volume, reserve, 50, bip_to_pip(105_000)).unwrap();
        assert_close(minted, bip_to_pip(100_000), 1_000_000);
    }

    #[test]
    fn inverses_agree() {
        let volume = bip_to_pip(1_000_000);
        let reserve = bip_to_pip(500_000);
        let want = bip_to_pip(9_950);
        let needed = sale_amount(volume, reserve, 50, want).unwrap();
        assert_close(needed, bip_to_pip(10_000), 1_000_000);
        assert!(sale_return(volume, reserve, 50, needed).unwrap() >= want - 1);

        let deposit = buy_deposit(volume, reserve, 50, bip_to_pip(100_000)).unwrap();
        assert_close(deposit, bip_to_pip(105_000), 1_000_000);
    }

    #[test]
    fn selling_whole_supply_returns_whole_reserve() {
        assert_eq!(sale_return(1_000, 777, 40, 1_000).unwrap(), 777);
        assert_eq!(sale_amount(1_000, 777, 40, 777).unwrap(), 1_000);
    }

    #[test]
    fn low_crr_curve_stays_bounded() {
        let volume = bip_to_pip(1_000_000);
        let reserve = bip_to_pip(20_000);
        let ret = sale_return(volume, reserve, 10, bip_to_pip(500_000)).unwrap();
        // 1 − 0.5^10
        assert_close(ret, reserve - reserve / 1024, 1_000_000);
    }

    #[test]
    fn zero_amounts_are_free() {
        assert_eq!(sale_return(0, 0, 0, 0).unwrap(), 0);
        assert_eq!(purchase_return(10, 10, 50, 0).unwrap(), 0);
        assert_eq!(sale_amount(10, 10, 50, 0).unwrap(), 0);
        assert_eq!(buy_deposit(10, 10, 50, 0).unwrap(), 0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(sale_return(10, 10, 0, 1), Err(CurveError::InvalidCrr(0)));
        assert_eq!(sale_return(10, 10, 101, 1), Err(CurveError::InvalidCrr(101)));
        assert_eq!(sale_return(0, 10, 50, 1), Err(CurveError::EmptyCurve));
        assert_eq!(purchase_return(10, 0, 50, 1), Err(CurveError::EmptyCurve));
        assert_eq!(
            sale_return(10, 10, 50, 11),
            Err(CurveError::ReserveUnderflow {
                requested: 11,
                available: 10
            })
        );
        assert!(matches!(
            sale_amount(10, 10, 50, 11),
            Err(CurveError::ReserveUnderflow { .. })
        ));
    }

    #[test]
    fn purchase_overflow_is_reported() {
        assert_eq!(
            purchase_return(u128::MAX, 1, 100, u128::MAX),
            Err(CurveError::SupplyOverflow)
        );
        assert_eq!(
            purchase_return(u128::MAX / 2, 1, 50, u128::MAX),
            Err(CurveError::SupplyOverflow)
        );
    }
}
