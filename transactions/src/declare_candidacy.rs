//! DeclareCandidacy: register a validator candidate with a self-stake.

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

pub const GAS: u64 = 10_000;

const MAX_COMMISSION: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclareCandidacyData {
    pub reward_address: Address,
    pub pub_key: PublicKey,
    /// Validator commission, percent.
    pub commission: u32,
    pub coin: CoinId,
    pub stake: u128,
}

impl Handler for DeclareCandidacyData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        if self.commission > MAX_COMMISSION {
            return Err(TxError::reject(
                Code::WrongCommission,
                "commission should be between 0 and 100",
                json!({ "got_commission": self.commission }),
            ));
        }
        if !state.coins.exists(self.coin)? {
            return Err(TxError::reject(
                Code::CoinNotExists,
                "coin does not exist",
                json!({ "coin": self.coin.to_string() }),
            ));
        }
        if state.candidates.exists(&self.pub_key)? {
            return Err(TxError::reject(
                Code::CandidateExists,
                "candidate with such public key already exists",
                json!({ "public_key": self.pub_key.to_string() }),
            ));
        }
        if self.stake == 0 {
            return Err(TxError::reject(Code::StakeShouldBePositive, "stake should be positive", json!({})));
        }
        if !state.candidates.is_new_candidate_stake_sufficient(
            self.coin,
            self.stake,
            ctx.validators_limit,
            &mut state.coins,
        )? {
            return Err(TxError::reject(
                Code::TooLowStake,
                "given stake is too low",
                json!({ "stake": self.stake.to_string(), "coin": self.coin.to_string() }),
            ));
        }

        let base = commission_in_base(tx.gas_price, GAS)?;
        let (_, _, commission) = price_commission(state, tx.gas_coin, base)?;
        require_funds(
            state,
            &sender,
            &[(self.coin, self.stake), (tx.gas_coin, commission.amount_in)],
        )?;

        pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
        state.accounts.sub_balance(&sender, self.coin, self.stake)?;
        state.candidates.create(
            sender,
            self.reward_address,
            self.pub_key,
            self.commission,
            ctx.height,
        )?;
        state
            .candidates
            .delegate(sender, &self.pub_key, self.coin, self.stake)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.public_key", self.pub_key.to_string()),
        ])
    }
}
