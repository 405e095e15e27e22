//! Sell and buy estimates for read queries.

use serde::Serialize;
use serde_json::json;
use strata_state::State;
use strata_types::CoinId;

use crate::code::Code;
use crate::commission::{
    commission_in_base, price_commission, quote_buy, quote_sell, Source, SwapFrom,
};
use crate::error::TxError;
use crate::sell_coin;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SellEstimate {
    pub will_get: u128,
    /// Commission in the sold coin.
    pub commission: u128,
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuyEstimate {
    pub will_pay: u128,
    /// Commission in the sold coin.
    pub commission: u128,
    pub source: Source,
}

fn require_pair(state: &mut State, coin_to_sell: CoinId, coin_to_buy: CoinId) -> Result<(), TxError> {
    for coin in [coin_to_sell, coin_to_buy] {
        if !state.coins.exists(coin)? {
            return Err(TxError::reject(
                Code::CoinNotExists,
                "coin does not exist",
                json!({ "coin": coin.to_string() }),
            ));
        }
    }
    if coin_to_sell == coin_to_buy {
        return Err(TxError::reject(
            Code::CrossConvert,
            "\"from\" coin equals \"to\" coin",
            json!({ "coin": coin_to_sell.to_string() }),
        ));
    }
    Ok(())
}

/// What selling `value_to_sell` of `coin_to_sell` would return, with the
/// commission paid in the sold coin at gas price 1.
pub fn estimate_coin_sell(
    state: &mut State,
    coin_to_sell: CoinId,
    coin_to_buy: CoinId,
    value_to_sell: u128,
    swap_from: SwapFrom,
) -> Result<SellEstimate, TxError> {
    require_pair(state, coin_to_sell, coin_to_buy)?;
    let from = state.coins.require(coin_to_sell)?;
    let to = state.coins.require(coin_to_buy)?;
    let pool = state.swap.pair(coin_to_sell, coin_to_buy)?;
    let quote = quote_sell(&from, &to, pool.as_ref(), value_to_sell, swap_from)?;

    let base = commission_in_base(1, sell_coin::GAS)?;
    let (_, _, commission) = price_commission(state, coin_to_sell, base)?;
    Ok(SellEstimate {
        will_get: quote.amount_out,
        commission: commission.amount_in,
        source: quote.source,
    })
}

/// What buying `value_to_buy` of `coin_to_buy` would cost in
/// `coin_to_sell`, with the commission paid in the sold coin.
pub fn estimate_coin_buy(
    state: &mut State,
    coin_to_sell: CoinId,
    coin_to_buy: CoinId,
    value_to_buy: u128,
    swap_from: SwapFrom,
) -> Result<BuyEstimate, TxError> {
    require_pair(state, coin_to_sell, coin_to_buy)?;
    let from = state.coins.require(coin_to_sell)?;
    let to = state.coins.require(coin_to_buy)?;
    let pool = state.swap.pair(coin_to_sell, coin_to_buy)?;
    let quote = quote_buy(&from, &to, pool.as_ref(), value_to_buy, swap_from)?;

    let base = commission_in_base(1, sell_coin::GAS)?;
    let (_, _, commission) = price_commission(state, coin_to_sell, base)?;
    Ok(BuyEstimate {
        will_pay: quote.amount_in,
        commission: commission.amount_in,
        source: quote.source,
    })
}
