//! SellCoin: convert an exact amount of one coin into another through the
//! bonding curve or a swap pool.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::{Address, CoinId};

use crate::code::Code;
use crate::commission::{
    commission_in_base, pay_commission, price_commission, quote_sell, require_funds,
    simulate_commission, Source, SwapFrom,
};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellCoinData {
    pub coin_to_sell: CoinId,
    pub value_to_sell: u128,
    pub coin_to_buy: CoinId,
    pub min_value_to_buy: u128,
    pub swap_from: SwapFrom,
}

fn same_pair(a: (CoinId, CoinId), b: (CoinId, CoinId)) -> bool {
    a == b || (a.0 == b.1 && a.1 == b.0)
}

impl Handler for SellCoinData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        for coin in [self.coin_to_sell, self.coin_to_buy] {
            if !state.coins.exists(coin)? {
                return Err(TxError::reject(
                    Code::CoinNotExists,
                    "coin does not exist",
                    json!({ "coin": coin.to_string() }),
                ));
            }
        }
        if self.coin_to_sell == self.coin_to_buy {
            return Err(TxError::reject(
                Code::CrossConvert,
                "\"from\" coin equals \"to\" coin",
                json!({ "coin": self.coin_to_sell.to_string() }),
            ));
        }

        // The commission is taken first, so the sale is priced against the
        // coin and pool values the commission leaves behind.
        let base = commission_in_base(tx.gas_price, GAS)?;
        let (mut gas_coin, mut gas_pool, commission) = price_commission(state, tx.gas_coin, base)?;
        simulate_commission(&mut gas_coin, gas_pool.as_mut(), &commission)?;

        let from = if self.coin_to_sell == gas_coin.id {
            gas_coin.clone()
        } else {
            state.coins.require(self.coin_to_sell)?
        };
        let to = if self.coin_to_buy == gas_coin.id {
            gas_coin.clone()
        } else {
            state.coins.require(self.coin_to_buy)?
        };
        let pool = if !gas_coin.is_base()
            && same_pair((self.coin_to_sell, self.coin_to_buy), (gas_coin.id, CoinId::BASE))
        {
            gas_pool
        } else {
            state.swap.pair(self.coin_to_sell, self.coin_to_buy)?
        };

        let quote = quote_sell(&from, &to, pool.as_ref(), self.value_to_sell, self.swap_from)?;
        if quote.amount_out < self.min_value_to_buy {
            return Err(TxError::reject(
                Code::MinimumValueToBuyReached,
                format!(
                    "you wanted to get minimum {}, but currently you will get {}",
                    self.min_value_to_buy, quote.amount_out
                ),
                json!({
                    "minimum_value_to_buy": self.min_value_to_buy.to_string(),
                    "will_get_value": quote.amount_out.to_string(),
                }),
            ));
        }
        require_funds(
            state,
            &sender,
            &[
                (self.coin_to_sell, self.value_to_sell),
                (tx.gas_coin, commission.amount_in),
            ],
        )?;

        pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
        state
            .accounts
            .sub_balance(&sender, self.coin_to_sell, self.value_to_sell)?;
        match quote.source {
            Source::Bancor => {
                state.coins.sub_volume(self.coin_to_sell, self.value_to_sell)?;
                state.coins.sub_reserve(self.coin_to_sell, quote.base)?;
                state.coins.add_volume(self.coin_to_buy, quote.amount_out)?;
                state.coins.add_reserve(self.coin_to_buy, quote.base)?;
            }
            Source::Pool => {
                state.swap.swap_sell(
                    self.coin_to_sell,
                    self.coin_to_buy,
                    self.value_to_sell,
                    quote.amount_out,
                )?;
            }
        }
        state
            .accounts
            .add_balance(&sender, self.coin_to_buy, quote.amount_out)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.coin_to_sell", self.coin_to_sell.to_string()),
            Tag::new("tx.coin_to_buy", self.coin_to_buy.to_string()),
            Tag::new("tx.return", quote.amount_out.to_string()),
            Tag::new("tx.source", quote.source.as_str()),
        ])
    }
}
