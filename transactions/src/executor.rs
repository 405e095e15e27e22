//! Transaction executor: envelope checks, dispatch, nonce bookkeeping.

use serde_json::json;
use strata_state::{State, StateError};
use strata_types::params::{MAX_PAYLOAD_LENGTH, MAX_TX_LENGTH};
use strata_types::ChainId;

use crate::code::Code;
use crate::error::TxError;
use crate::response::{Response, Tag};
use crate::Transaction;

/// Block-level inputs shared by every transaction of a block.
#[derive(Clone, Debug)]
pub struct Context {
    pub chain_id: ChainId,
    pub height: u64,
    /// Validator slots; once filled, a new candidate must outrank someone.
    pub validators_limit: usize,
    /// Base-coin commission collected so far.
    pub reward_pool: u128,
}

impl Context {
    pub fn new(chain_id: ChainId, height: u64, validators_limit: usize) -> Self {
        Self {
            chain_id,
            height,
            validators_limit,
            reward_pool: 0,
        }
    }
}

/// Validate and apply one encoded transaction.
///
/// Rejections come back as `Ok` responses with a non-zero code and leave the
/// view untouched; `Err` means the view itself failed.
pub fn run_tx(state: &mut State, raw: &[u8], ctx: &mut Context) -> Result<Response, StateError> {
    match execute(state, raw, ctx) {
        Ok(response) => Ok(response),
        Err(TxError::Rejected(response)) => {
            tracing::debug!(code = %response.code, log = %response.log, "transaction rejected");
            Ok(*response)
        }
        Err(TxError::State(e)) => Err(e),
        Err(TxError::Encode(e)) => Err(StateError::Encode(e)),
    }
}

fn execute(state: &mut State, raw: &[u8], ctx: &mut Context) -> Result<Response, TxError> {
    let tx = Transaction::decode(raw)?;

    if raw.len() > MAX_TX_LENGTH {
        return Err(TxError::reject(
            Code::TxTooLarge,
            format!("transaction length is over {MAX_TX_LENGTH} bytes"),
            json!({ "max_tx_length": MAX_TX_LENGTH, "got_tx_length": raw.len() }),
        ));
    }
    if tx.payload.len() > MAX_PAYLOAD_LENGTH {
        return Err(TxError::reject(
            Code::TxPayloadTooLarge,
            format!("payload length is over {MAX_PAYLOAD_LENGTH} bytes"),
            json!({ "max_payload_length": MAX_PAYLOAD_LENGTH, "got_payload_length": tx.payload.len() }),
        ));
    }
    if tx.chain_id != ctx.chain_id {
        return Err(TxError::reject(
            Code::WrongChainId,
            "wrong chain id",
            json!({ "current_chain_id": ctx.chain_id.as_str(), "got_chain_id": tx.chain_id.as_str() }),
        ));
    }
    if !tx.verify_signature()? {
        return Err(TxError::reject(
            Code::DecodeError,
            "invalid transaction signature",
            json!({}),
        ));
    }
    if tx.gas_price == 0 {
        return Err(TxError::reject(Code::TooLowGasPrice, "gas price must be positive", json!({})));
    }
    if !state.coins.exists(tx.gas_coin)? {
        return Err(TxError::reject(
            Code::CoinNotExists,
            "gas coin does not exist",
            json!({ "gas_coin": tx.gas_coin.to_string() }),
        ));
    }

    let sender = tx.sender();
    let expected = state.accounts.get_nonce(&sender)?.saturating_add(1);
    if tx.nonce != expected {
        return Err(TxError::reject(
            Code::WrongNonce,
            format!("unexpected nonce: expected {expected}, got {}", tx.nonce),
            json!({ "expected_nonce": expected, "got_nonce": tx.nonce }),
        ));
    }

    let mut tags = vec![Tag::new("tx.type", hex::encode([tx.data.type_byte()]))];
    tags.extend(tx.data.handler().run(&tx, sender, state, ctx)?);
    state.accounts.set_nonce(&sender, tx.nonce)?;

    tracing::debug!(%sender, nonce = tx.nonce, tx_type = tx.data.type_byte(), "transaction applied");
    Ok(Response::ok(tx.gas(), tags))
}
