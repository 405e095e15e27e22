//! Unbond: withdraw part of a stake into frozen funds released after the
//! unbond period.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::params::UNBOND_PERIOD;
use strata_types::{Address, CoinId, PublicKey};

use crate::code::Code;
use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondData {
    pub pub_key: PublicKey,
    pub coin: CoinId,
    pub value: u128,
}

impl Handler for UnbondData {
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
        let staked = state
            .candidates
            .get_stake_of_address(&self.pub_key, &sender, self.coin)?
            .map(|stake| stake.value);
        match staked {
            None => {
                return Err(TxError::reject(
                    Code::StakeNotFound,
                    "stake of current user not found",
                    json!({ "public_key": self.pub_key.to_string(), "coin": self.coin.to_string() }),
                ))
            }
            Some(staked) if staked < self.value => {
                return Err(TxError::reject(
                    Code::InsufficientStake,
                    "insufficient stake for sender account",
                    json!({ "needed": self.value.to_string(), "available": staked.to_string() }),
                ))
            }
            Some(_) => {}
        }

        let base = commission_in_base(tx.gas_price, GAS)?;
        let (_, _, commission) = price_commission(state, tx.gas_coin, base)?;
        require_funds(state, &sender, &[(tx.gas_coin, commission.amount_in)])?;

        pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
        state
            .candidates
            .sub_stake(&sender, &self.pub_key, self.coin, self.value)?;
        let release = ctx.height.saturating_add(UNBOND_PERIOD);
        state
            .frozen_funds
            .add_frozen_fund(release, sender, self.pub_key, self.coin, self.value)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.public_key", self.pub_key.to_string()),
            Tag::new("tx.release_height", release.to_string()),
        ])
    }
}
