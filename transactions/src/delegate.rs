//! Delegate: stake coins with a candidate. The stake is queued and joins the
//! candidate's list at the end of the block.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::{Address, CoinId, PublicKey};

use crate::code::Code;
use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateData {
    pub pub_key: PublicKey,
    pub coin: CoinId,
    pub value: u128,
}

impl Handler for DelegateData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        if self.value == 0 {
            return Err(TxError::reject(Code::StakeShouldBePositive, "stake should be positive", json!({})));
        }
        if !state.coins.exists(self.coin)? {
            return Err(TxError::reject(
                Code::CoinNotExists,
                "coin does not exist",
                json!({ "coin": self.coin.to_string() }),
            ));
        }
        if !state.candidates.exists(&self.pub_key)? {
            return Err(TxError::reject(
                Code::CandidateNotFound,
                "candidate with such public key not found",
                json!({ "public_key": self.pub_key.to_string() }),
            ));
        }
        if !state.candidates.is_delegator_stake_sufficient(
            &sender,
            &self.pub_key,
            self.coin,
            self.value,
            &mut state.coins,
        )? {
            return Err(TxError::reject(
                Code::TooLowStake,
                "stake is too low",
                json!({ "public_key": self.pub_key.to_string(), "value": self.value.to_string() }),
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
        state
            .candidates
            .delegate(sender, &self.pub_key, self.coin, self.value)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.to", self.pub_key.to_string()),
            Tag::new("tx.coin", self.coin.to_string()),
        ])
    }
}
