//! EditCandidate: the owner changes the candidate's owner and reward
//! addresses.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::{Address, PublicKey};

use crate::code::Code;
use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCandidateData {
    pub pub_key: PublicKey,
    pub reward_address: Address,
    pub owner_address: Address,
}

/// Reject unless `sender` owns the candidate.
pub(crate) fn require_owner(
    state: &mut State,
    pub_key: &PublicKey,
    sender: &Address,
) -> Result<(), TxError> {
    let candidate = state.candidates.get_candidate(pub_key)?.ok_or_else(|| {
        TxError::reject(
            Code::CandidateNotFound,
            "candidate with such public key not found",
            json!({ "public_key": pub_key.to_string() }),
        )
    })?;
    if candidate.owner != *sender {
        return Err(TxError::reject(
            Code::IsNotOwnerOfCandidate,
            "sender is not an owner of a candidate",
            json!({ "public_key": pub_key.to_string(), "sender": sender.to_string() }),
        ));
    }
    Ok(())
}

impl Handler for EditCandidateData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        require_owner(state, &self.pub_key, &sender)?;

        let base = commission_in_base(tx.gas_price, GAS)?;
        let (_, _, commission) = price_commission(state, tx.gas_coin, base)?;
        require_funds(state, &sender, &[(tx.gas_coin, commission.amount_in)])?;

        pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
        state
            .candidates
            .edit(&self.pub_key, self.owner_address, self.reward_address)?;

        Ok(vec![
            Tag::new("tx.from", hex::encode(sender.as_bytes())),
            Tag::new("tx.public_key", self.pub_key.to_string()),
        ])
    }
}
