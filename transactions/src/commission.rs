//! Commission router: prices a conversion through the bonding curve, a swap
//! pool, or whichever of the two is cheaper for the payer.
//!
//! The quoting functions are pure over `Coin` and `Pool` values, so a
//! handler can price several legs against the state it will see after the
//! earlier legs are applied, and reject before touching anything.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_formula::amm;
use strata_state::{Coin, Pool, State};
use strata_types::params::COMMISSION_MULTIPLIER;
use strata_types::{Address, CoinId};

use crate::code::Code;
use crate::error::TxError;

/// Which liquidity source a conversion may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapFrom {
    Bancor,
    Pool,
    #[default]
    Optimal,
}

/// The source a quote was priced on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Bancor,
    Pool,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bancor => "bancor",
            Self::Pool => "pool",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub source: Source,
    pub amount_in: u128,
    pub amount_out: u128,
    /// Base coin moved through the reserves on the bonding-curve path.
    pub base: u128,
}

/// `gas_price · gas · 10^15` pip of the base coin.
pub fn commission_in_base(gas_price: u32, gas: u64) -> Result<u128, TxError> {
    u128::from(gas_price)
        .checked_mul(u128::from(gas))
        .and_then(|v| v.checked_mul(COMMISSION_MULTIPLIER))
        .ok_or_else(|| TxError::reject(Code::CoinSupplyOverflow, "commission overflows", json!({})))
}

/// Pick between the two legs. `prefer_pool(bancor, pool)` decides when both
/// are viable; ties always go to the bonding curve.
fn choose(
    swap_from: SwapFrom,
    bancor: impl FnOnce() -> Result<Quote, TxError>,
    pool: impl FnOnce() -> Result<Quote, TxError>,
    prefer_pool: impl FnOnce(&Quote, &Quote) -> bool,
) -> Result<Quote, TxError> {
    match swap_from {
        SwapFrom::Bancor => bancor(),
        SwapFrom::Pool => pool(),
        SwapFrom::Optimal => match (bancor(), pool()) {
            (Ok(b), Ok(p)) => Ok(if prefer_pool(&b, &p) { p } else { b }),
            (Ok(b), Err(_)) => Ok(b),
            (Err(_), Ok(p)) => Ok(p),
            (Err(eb), Err(ep)) => Err(TxError::reject(
                Code::CommissionCoinNotSufficient,
                "not possible to exchange through either source",
                json!({ "bancor": eb.to_string(), "pool": ep.to_string() }),
            )),
        },
    }
}

/// Coins of `coin` to pay so that `base` base coin comes out.
/// `pool` is the `(coin, base)` pool, if any.
pub fn quote_commission(
    coin: &Coin,
    pool: Option<&Pool>,
    base: u128,
    swap_from: SwapFrom,
) -> Result<Quote, TxError> {
    if coin.is_base() {
        return Ok(Quote {
            source: Source::Bancor,
            amount_in: base,
            amount_out: base,
            base,
        });
    }
    choose(
        swap_from,
        || {
            coin.check_reserve_underflow(base)?;
            Ok(Quote {
                source: Source::Bancor,
                amount_in: coin.sale_amount(base)?,
                amount_out: base,
                base,
            })
        },
        || {
            let pool = pool.ok_or(strata_formula::SwapError::PairNotExists(coin.id, CoinId::BASE))?;
            let (reserve_in, reserve_out) = pool.reserves_for(coin.id);
            Ok(Quote {
                source: Source::Pool,
                amount_in: amm::calculate_sell_for_buy(reserve_in, reserve_out, base)?,
                amount_out: base,
                base: 0,
            })
        },
        |b, p| p.amount_in < b.amount_in,
    )
}

/// Output of selling `amount_in` of `from` for `to`. `pool` is the
/// `(from, to)` pool, if any. The larger output wins.
pub fn quote_sell(
    from: &Coin,
    to: &Coin,
    pool: Option<&Pool>,
    amount_in: u128,
    swap_from: SwapFrom,
) -> Result<Quote, TxError> {
    choose(
        swap_from,
        || {
            let base = from.sale_return(amount_in)?;
            from.check_reserve_underflow(base)?;
            let out = to.purchase_return(base)?;
            to.check_supply_overflow(out)?;
            Ok(Quote {
                source: Source::Bancor,
                amount_in,
                amount_out: out,
                base,
            })
        },
        || {
            let pool = pool.ok_or(strata_formula::SwapError::PairNotExists(from.id, to.id))?;
            let (reserve_in, reserve_out) = pool.reserves_for(from.id);
            let out = amm::calculate_buy_for_sell(reserve_in, reserve_out, amount_in)?;
            amm::check_swap(out, 0)?;
            Ok(Quote {
                source: Source::Pool,
                amount_in,
                amount_out: out,
                base: 0,
            })
        },
        |b, p| p.amount_out > b.amount_out,
    )
}

/// Input of `from` needed to receive `amount_out` of `to`. The smaller
/// input wins.
pub fn quote_buy(
    from: &Coin,
    to: &Coin,
    pool: Option<&Pool>,
    amount_out: u128,
    swap_from: SwapFrom,
) -> Result<Quote, TxError> {
    choose(
        swap_from,
        || {
            to.check_supply_overflow(amount_out)?;
            let base = to.buy_deposit(amount_out)?;
            from.check_reserve_underflow(base)?;
            Ok(Quote {
                source: Source::Bancor,
                amount_in: from.sale_amount(base)?,
                amount_out,
                base,
            })
        },
        || {
            let pool = pool.ok_or(strata_formula::SwapError::PairNotExists(from.id, to.id))?;
            let (reserve_in, reserve_out) = pool.reserves_for(from.id);
            Ok(Quote {
                source: Source::Pool,
                amount_in: amm::calculate_sell_for_buy(reserve_in, reserve_out, amount_out)?,
                amount_out,
                base: 0,
            })
        },
        |b, p| p.amount_in < b.amount_in,
    )
}

/// Price a base-coin fee in `gas_coin` against the current state.
pub fn price_commission(
    state: &mut State,
    gas_coin: CoinId,
    base: u128,
) -> Result<(Coin, Option<Pool>, Quote), TxError> {
    let coin = state.coins.require(gas_coin)?;
    let pool = state.swap.pair(gas_coin, CoinId::BASE)?;
    let quote = quote_commission(&coin, pool.as_ref(), base, SwapFrom::Optimal)?;
    Ok((coin, pool, quote))
}

/// Apply a commission quote to in-memory copies of the gas coin and its
/// base pool, mirroring what `pay_commission` does to the state.
pub fn simulate_commission(
    coin: &mut Coin,
    pool: Option<&mut Pool>,
    quote: &Quote,
) -> Result<(), TxError> {
    if coin.is_base() {
        return Ok(());
    }
    match quote.source {
        Source::Bancor => {
            coin.volume = coin.volume.saturating_sub(quote.amount_in);
            coin.reserve = coin.reserve.saturating_sub(quote.base);
        }
        Source::Pool => {
            if let Some(pool) = pool {
                pool.apply(coin.id, quote.amount_in, quote.amount_out)?;
            }
        }
    }
    Ok(())
}

/// Take a priced commission from `payer`. The base coin that comes out is
/// added to `reward_pool`.
pub fn pay_commission(
    state: &mut State,
    payer: &Address,
    gas_coin: CoinId,
    quote: &Quote,
    reward_pool: &mut u128,
) -> Result<(), TxError> {
    state.accounts.sub_balance(payer, gas_coin, quote.amount_in)?;
    if !gas_coin.is_base_coin() {
        match quote.source {
            Source::Bancor => {
                state.coins.sub_volume(gas_coin, quote.amount_in)?;
                state.coins.sub_reserve(gas_coin, quote.base)?;
            }
            Source::Pool => {
                state
                    .swap
                    .swap_buy(gas_coin, CoinId::BASE, quote.amount_out, quote.amount_in)?;
            }
        }
    }
    *reward_pool = reward_pool.saturating_add(quote.amount_out);
    Ok(())
}

/// Reject with `InsufficientFunds` unless `owner` holds every listed amount.
/// Amounts of the same coin are added up.
pub fn require_funds(
    state: &mut State,
    owner: &Address,
    needs: &[(CoinId, u128)],
) -> Result<(), TxError> {
    let mut totals: Vec<(CoinId, u128)> = Vec::new();
    for &(coin, value) in needs {
        match totals.iter_mut().find(|(c, _)| *c == coin) {
            Some((_, total)) => *total = total.saturating_add(value),
            None => totals.push((coin, value)),
        }
    }
    for (coin, needed) in totals {
        let available = state.accounts.get_balance(owner, coin)?;
        if available < needed {
            return Err(TxError::reject(
                Code::InsufficientFunds,
                format!("insufficient funds for {owner}: wanted {needed} of coin {coin}"),
                json!({
                    "sender": owner.to_string(),
                    "coin": coin.to_string(),
                    "needed": needed.to_string(),
                    "available": available.to_string(),
                }),
            ));
        }
    }
    Ok(())
}
