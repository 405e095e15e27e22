//! SetCandidateOnline / SetCandidateOffline.

use serde::{Deserialize, Serialize};
use strata_state::State;
use strata_types::{Address, PublicKey};

use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::edit_candidate::require_owner;
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCandidateOnlineData {
    pub pub_key: PublicKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCandidateOfflineData {
    pub pub_key: PublicKey,
}

fn set_status(
    pub_key: &PublicKey,
    online: bool,
    tx: &Transaction,
    sender: Address,
    state: &mut State,
    ctx: &mut Context,
) -> Result<Vec<Tag>, TxError> {
    require_owner(state, pub_key, &sender)?;

    let base = commission_in_base(tx.gas_price, GAS)?;
    let (_, _, commission) = price_commission(state, tx.gas_coin, base)?;
    require_funds(state, &sender, &[(tx.gas_coin, commission.amount_in)])?;

    pay_commission(state, &sender, tx.gas_coin, &commission, &mut ctx.reward_pool)?;
    if online {
        state.candidates.set_online(pub_key)?;
    } else {
        state.candidates.set_offline(pub_key)?;
    }

    Ok(vec![
        Tag::new("tx.from", hex::encode(sender.as_bytes())),
        Tag::new("tx.public_key", pub_key.to_string()),
    ])
}

impl Handler for SetCandidateOnlineData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        set_status(&self.pub_key, true, tx, sender, state, ctx)
    }
}

impl Handler for SetCandidateOfflineData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        set_status(&self.pub_key, false, tx, sender, state, ctx)
    }
}
