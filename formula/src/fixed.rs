//! Binary fixed-point `ln`/`exp` over 256-bit integers.
//!
//! Values carry `FRACTION_BITS` fractional bits. Series are summed until the
//! next term truncates to zero, so results depend only on integer arithmetic.

use primitive_types::{U256, U512};

pub(crate) const FRACTION_BITS: usize = 120;

/// ln(2) scaled by 2^120, rounded down.
const LN2: U256 = U256([0xabc9_e3b3_9803_f2f6, 0x00b1_7217_f7d1_cf79, 0, 0]);

/// Largest power of two `exp_pos` may scale by before leaving 256 bits.
const MAX_EXP_SHIFT: usize = 134;

pub(crate) fn one() -> U256 {
    U256::one() << FRACTION_BITS
}

fn mul(a: U256, b: U256) -> U256 {
    (a * b) >> FRACTION_BITS
}

/// 2·atanh(z) for a fixed-point `z` in [0, 1/3].
fn two_atanh(z: U256) -> U256 {
    let z2 = mul(z, z);
    let mut sum = z;
    let mut term = z;
    let mut k = 3u64;
    loop {
        term = mul(term, z2);
        if term.is_zero() {
            break;
        }
        sum += term / U256::from(k);
        k += 2;
    }
    sum << 1
}

/// ln(n) for an integer `n >= 1`.
fn ln_int(n: U256) -> U256 {
    let k = n.bits() - 1;
    let mantissa = if k > FRACTION_BITS {
        n >> (k - FRACTION_BITS)
    } else {
        n << (FRACTION_BITS - k)
    };
    let unit = one();
    let z = ((mantissa - unit) << FRACTION_BITS) / (mantissa + unit);
    LN2 * U256::from(k) + two_atanh(z)
}

/// |ln(num / den)| and whether the logarithm is negative.
///
/// Ratios within a factor of two use the rational atanh form directly, which
/// keeps full precision for trades that are tiny relative to the curve.
fn ln_ratio(num: U256, den: U256) -> (U256, bool) {
    let (hi, lo, negative) = if num >= den {
        (num, den, false)
    } else {
        (den, num, true)
    };
    if hi == lo {
        return (U256::zero(), false);
    }
    let magnitude = if hi <= lo << 1 {
        two_atanh(((hi - lo) << FRACTION_BITS) / (hi + lo))
    } else {
        ln_int(hi).saturating_sub(ln_int(lo))
    };
    (magnitude, negative)
}

/// e^r for 0 <= r < ln 2; the result lies in [1, 2).
fn exp_reduced(r: U256) -> U256 {
    let unit = one();
    let mut sum = unit;
    let mut term = unit;
    let mut i = 1u64;
    loop {
        term = mul(term, r) / U256::from(i);
        if term.is_zero() {
            break;
        }
        sum += term;
        i += 1;
    }
    sum
}

/// e^y, or `None` when the result does not fit in 256 bits.
fn exp_pos(y: U256) -> Option<U256> {
    let n = y / LN2;
    if n > U256::from(MAX_EXP_SHIFT) {
        return None;
    }
    let shift = n.as_usize();
    let r = y - LN2 * n;
    Some(exp_reduced(r) << shift)
}

/// e^-y; underflows to zero once the result is below 2^-120.
fn exp_neg(y: U256) -> U256 {
    let n = y / LN2;
    if n >= U256::from(FRACTION_BITS) {
        return U256::zero();
    }
    let shift = n.as_usize();
    let r = y - LN2 * n;
    ((one() << FRACTION_BITS) / exp_reduced(r)) >> shift
}

/// (num / den)^(exp_num / exp_den) as a fixed-point value.
///
/// `num` and `den` must be non-zero. Returns `None` on overflow.
pub(crate) fn pow_ratio(num: U256, den: U256, exp_num: u32, exp_den: u32) -> Option<U256> {
    if num == den {
        return Some(one());
    }
    let (ln, negative) = ln_ratio(num, den);
    let y = ln * U256::from(exp_num) / U256::from(exp_den);
    if negative {
        Some(exp_neg(y))
    } else {
        exp_pos(y)
    }
}

fn narrow_u512(x: U512) -> Option<U256> {
    if x.bits() > 256 {
        return None;
    }
    let limbs = x.0;
    Some(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

pub(crate) fn to_u128(x: U256) -> Option<u128> {
    if x.bits() > 128 {
        None
    } else {
        Some(x.low_u128())
    }
}

/// floor(a · f) for an integer `a` and fixed-point `f`.
pub(crate) fn mul_frac_floor(a: u128, f: U256) -> Option<u128> {
    let prod = U256::from(a).full_mul(f);
    narrow_u512(prod >> FRACTION_BITS).and_then(to_u128)
}

/// ceil(a · f) for an integer `a` and fixed-point `f`.
pub(crate) fn mul_frac_ceil(a: u128, f: U256) -> Option<u128> {
    let prod = U256::from(a).full_mul(f);
    let mask = (U512::one() << FRACTION_BITS) - U512::one();
    let mut floor = narrow_u512(prod >> FRACTION_BITS)?;
    if !(prod & mask).is_zero() {
        floor += U256::one();
    }
    to_u128(floor)
}

/// floor(a · b / c).
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    to_u128(U256::from(a) * U256::from(b) / U256::from(c))
}

/// ceil(a · b / c).
pub(crate) fn mul_div_ceil(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let c = U256::from(c);
    to_u128((U256::from(a) * U256::from(b) + c - U256::one()) / c)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Absolute distance between two fixed-point values.
    fn distance(a: U256, b: U256) -> U256 {
        if a > b {
            a - b
        } else {
            b - a
        }
    }

    /// 2^-100 is far below anything a pip-denominated result can observe.
    fn tolerance() -> U256 {
        U256::one() << 20
    }

    #[test]
    fn ln_of_one_is_zero() {
        assert!(ln_int(U256::one()).is_zero());
    }

    #[test]
    fn ln_of_power_of_two() {
        let ln8 = ln_int(U256::from(8u32));
        assert!(distance(ln8, LN2 * U256::from(3u32)) < tolerance());
    }

    #[test]
    fn exp_inverts_ln() {
        let x = exp_pos(LN2).unwrap();
        assert!(distance(x, one() << 1) < tolerance());
    }

    #[test]
    fn square_root_of_quarter() {
        let half = pow_ratio(U256::from(1u32), U256::from(4u32), 1, 2).unwrap();
        assert!(distance(half, one() >> 1) < tolerance());
    }

    #[test]
    fn square_of_ratio() {
        // (11/10)^2 = 1.21
        let v = pow_ratio(U256::from(11u32), U256::from(10u32), 2, 1).unwrap();
        let expected = one() * U256::from(121u32) / U256::from(100u32);
        assert!(distance(v, expected) < tolerance());
    }

    #[test]
    fn exp_neg_underflows_to_zero() {
        assert!(exp_neg(LN2 * U256::from(200u32)).is_zero());
    }

    #[test]
    fn exp_pos_overflow_is_reported() {
        assert!(exp_pos(LN2 * U256::from(200u32)).is_none());
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(mul_div_floor(10, 10, 3), Some(33));
        assert_eq!(mul_div_ceil(10, 10, 3), Some(34));
        assert_eq!(mul_div_ceil(10, 9, 3), Some(30));
        assert_eq!(mul_div_floor(1, 1, 0), None);
        assert_eq!(mul_frac_floor(10, one() >> 1), Some(5));
        assert_eq!(mul_frac_ceil(11, one() >> 1), Some(6));
        assert_eq!(mul_frac_floor(u128::MAX, one() << 1), None);
    }
}
