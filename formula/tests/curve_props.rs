use proptest::prelude::*;

use strata_formula::{
    buy_deposit, calculate_buy_for_sell, calculate_sell_for_buy, purchase_return, sale_amount,
    sale_return,
};
use strata_types::bip_to_pip;

fn curve() -> impl Strategy<Value = (u128, u128, u32)> {
    (
        bip_to_pip(1_000)..bip_to_pip(1_000_000_000),
        bip_to_pip(10_000)..bip_to_pip(100_000_000),
        10u32..=100,
    )
}

proptest! {
    /// Buying back what a sale returned restores the sold amount, up to rounding.
    #[test]
    fn sale_then_purchase_round_trips(
        (volume, reserve, crr) in curve(),
        fraction in 1u128..500,
    ) {
        let amount = volume / 1_000 * fraction;
        let ret = sale_return(volume, reserve, crr, amount).unwrap();
        prop_assume!(ret > 0 && ret < reserve);
        let bought = purchase_return(volume - amount, reserve - ret, crr, ret).unwrap();
        let diff = bought.abs_diff(amount);
        prop_assert!(
            diff <= 10 + amount / 1_000_000_000_000,
            "sold {} got back {} (diff {})", amount, bought, diff
        );
    }

    /// Selling more never returns less.
    #[test]
    fn sale_return_is_monotonic(
        (volume, reserve, crr) in curve(),
        a in 0u128..bip_to_pip(1_000),
        b in 0u128..bip_to_pip(1_000),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let r_lo = sale_return(volume, reserve, crr, lo).unwrap();
        let r_hi = sale_return(volume, reserve, crr, hi).unwrap();
        prop_assert!(r_lo <= r_hi, "sale_return({}) = {} > sale_return({}) = {}", lo, r_lo, hi, r_hi);
    }

    /// Depositing more never mints less.
    #[test]
    fn purchase_return_is_monotonic(
        (volume, reserve, crr) in curve(),
        a in 0u128..bip_to_pip(1_000_000),
        b in 0u128..bip_to_pip(1_000_000),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p_lo = purchase_return(volume, reserve, crr, lo).unwrap();
        let p_hi = purchase_return(volume, reserve, crr, hi).unwrap();
        prop_assert!(p_lo <= p_hi);
    }

    /// A sale never pays out more than the reserve.
    #[test]
    fn sale_return_is_bounded_by_reserve(
        (volume, reserve, crr) in curve(),
        fraction in 0u128..=1_000,
    ) {
        let amount = volume / 1_000 * fraction;
        prop_assert!(sale_return(volume, reserve, crr, amount).unwrap() <= reserve);
    }

    /// The inverse functions always cover what was asked for.
    #[test]
    fn inverses_cover_the_request(
        (volume, reserve, crr) in curve(),
        want in 1u128..bip_to_pip(1_000),
    ) {
        let sell = sale_amount(volume, reserve, crr, want).unwrap();
        let got = sale_return(volume, reserve, crr, sell).unwrap();
        prop_assert!(got + 10 >= want, "sale_amount {} yields {} < {}", sell, got, want);

        let deposit = buy_deposit(volume, reserve, crr, want).unwrap();
        let minted = purchase_return(volume, reserve, crr, deposit).unwrap();
        prop_assert!(minted + 10 >= want, "buy_deposit {} mints {} < {}", deposit, minted, want);
    }

    /// Swapping through a pool never shrinks the constant product.
    #[test]
    fn pool_product_never_decreases(
        reserve_in in 1_000u128..1_000_000_000_000_000_000,
        reserve_out in 1_000u128..1_000_000_000_000_000_000,
        amount_in in 1u128..1_000_000_000_000_000_000,
    ) {
        let out = calculate_buy_for_sell(reserve_in, reserve_out, amount_in).unwrap();
        prop_assert!(out < reserve_out);
        let before = reserve_in * reserve_out;
        let after = (reserve_in + amount_in) * (reserve_out - out);
        prop_assert!(after >= before);
    }

    /// The pool's buy price covers the requested output.
    #[test]
    fn pool_inverse_covers_the_request(
        reserve_in in 1_000u128..1_000_000_000_000,
        reserve_out in 1_000u128..1_000_000_000_000,
        amount_out in 1u128..1_000,
    ) {
        let need = calculate_sell_for_buy(reserve_in, reserve_out, amount_out).unwrap();
        let got = calculate_buy_for_sell(reserve_in, reserve_out, need).unwrap();
        prop_assert!(got >= amount_out);
    }
}
