//! RedeemCheck: cash a bearer check issued by another account.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_state::State;
use strata_types::params::MAX_CHECK_NONCE_LENGTH;
use strata_types::{Address, Signature};

use crate::check::Check;
use crate::code::Code;
use crate::commission::{commission_in_base, pay_commission, price_commission, require_funds};
use crate::error::TxError;
use crate::executor::Context;
use crate::response::Tag;
use crate::{Handler, Transaction};

pub const GAS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCheckData {
    pub raw_check: Vec<u8>,
    /// Lock key's signature over `Blake2b(sender address)`.
    pub proof: Signature,
}

impl Handler for RedeemCheckData {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError> {
        let check = Check::decode(&self.raw_check)?;

        // The issuer pays the commission, so the redeemer may not raise it.
        if tx.gas_price != 1 {
            return Err(TxError::reject(
                Code::TooHighGasPrice,
                "gas price for check is limited to 1",
                json!({ "gas_price": tx.gas_price }),
            ));
        }
        if check.chain_id != ctx.chain_id {
            return Err(TxError::reject(
                Code::WrongChainId,
                "wrong chain id",
                json!({
                    "current_chain_id": ctx.chain_id.as_str(),
                    "got_chain_id": check.chain_id.as_str(),
                }),
            ));
        }
        if check.nonce.len() > MAX_CHECK_NONCE_LENGTH {
            return Err(TxError::reject(
                Code::TooLongNonce,
                format!("nonce is too big, should be up to {MAX_CHECK_NONCE_LENGTH} bytes"),
                json!({}),
            ));
        }
        let issuer = check.issuer_address()?;
        for (field, coin) in [("coin", check.coin), ("gas_coin", check.gas_coin)] {
            if !state.coins.exists(coin)? {
                return Err(TxError::reject(
                    Code::CoinNotExists,
                    format!("check {field} does not exist"),
                    json!({ field: coin.to_string() }),
                ));
            }
        }
        if tx.gas_coin != check.gas_coin {
            return Err(TxError::reject(
                Code::WrongGasCoin,
                format!("gas coin for redeem check transaction can only be {}", check.gas_coin),
                json!({ "gas_coin": check.gas_coin.to_string() }),
            ));
        }
        if check.due_block < ctx.height {
            return Err(TxError::reject(
                Code::CheckExpired,
                "check expired",
                json!({ "due_block": check.due_block, "current_block": ctx.height }),
            ));
        }
        let hash = check.hash()?;
        if state.checks.is_check_used(&hash)? {
            return Err(TxError::reject(Code::CheckUsed, "check already redeemed", json!({})));
        }
        if !check.verify_lock()? {
            return Err(TxError::reject(Code::DecodeError, "invalid check lock signature", json!({})));
        }
        if !check.verify_proof(&self.proof, &sender) {
            return Err(TxError::reject(Code::CheckInvalidLock, "invalid proof", json!({})));
        }

        let base = commission_in_base(tx.gas_price, GAS)?;
        let (_, _, commission) = price_commission(state, check.gas_coin, base)?;
        require_funds(
            state,
            &issuer,
            &[(check.coin, check.value), (check.gas_coin, commission.amount_in)],
        )?;

        state.checks.use_check(hash);
        pay_commission(state, &issuer, check.gas_coin, &commission, &mut ctx.reward_pool)?;
        state.accounts.sub_balance(&issuer, check.coin, check.value)?;
        state.accounts.add_balance(&sender, check.coin, check.value)?;

        tracing::debug!(%issuer, redeemer = %sender, %hash, "check redeemed");
        Ok(vec![
            Tag::new("tx.from", hex::encode(issuer.as_bytes())),
            Tag::new("tx.to", hex::encode(sender.as_bytes())),
            Tag::new("tx.coin", check.coin.to_string()),
        ])
    }
}
