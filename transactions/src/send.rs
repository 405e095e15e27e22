//! Send: move coins between accounts.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::{Address, CoinId};

use crate::code::Code;
use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendData {
    pub coin: CoinId,
    pub to: Address,
    pub value: u128,
}

impl Handler for SendData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        if !state.coins.exists(self.coin)? {
            return Err(TxError::reject(
                Code::CoinNotExists,
                "coin does not exist",
                json!({ "coin": self.coin.to_string() }),
            ));
        }

        let base = commission_in_base(tx.gas_price, GAS)?;
        let (_, _, commission) = price_commission(state, tx.gas_coin, base)?;
        require_funds(
            state,
            &sender,
            &[(self.coin, self.value), (tx.gas_coin, commission.amount_in)],
        )?;

        pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
        state.accounts.sub_balance(&sender, self.coin, self.value)?;
        state.accounts.add_balance(&self.to, self.coin, self.value)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.to", hex::encode(self.to.as_bytes())),
            Tag::new("tx.coin", self.coin.to_string()),
        ])
    }
}
