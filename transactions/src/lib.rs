//! Strata transactions: the signed envelope, the executor that validates and
//! dispatches it, the commission router and one handler per transaction type.
//!
//! Transaction types:
//! - **Send**: move coins between accounts
//! - **SellCoin**: convert coins through the bonding curve or a swap pool
//! - **DeclareCandidacy**: register a validator candidate with a self-stake
//! - **Delegate**: stake coins with a candidate
//! - **Unbond**: withdraw a stake into frozen funds
//! - **EditCandidate**: change a candidate's owner and reward addresses
//! - **SetCandidateOnline** / **SetCandidateOffline**: toggle a candidate
//! - **RedeemCheck**: cash a bearer check

pub mod check;
pub mod code;
pub mod commission;
pub mod declare_candidacy;
pub mod delegate;
pub mod edit_candidate;
pub mod error;
pub mod estimate;
pub mod executor;
pub mod redeem_check;
pub mod response;
pub mod sell_coin;
pub mod send;
pub mod set_candidate_status;
pub mod unbond;

pub use check::Check;
pub use code::{Code, ErrorCategory};
pub use commission::{Quote, Source, SwapFrom};
pub use error::TxError;
pub use estimate::{estimate_coin_buy, estimate_coin_sell, BuyEstimate, SellEstimate};
pub use executor::{run_tx, Context};
pub use response::{Response, Tag};

use serde::{Deserialize, Serialize};
use strata_state::State;
use strata_types::{Address, ChainId, CoinId, Hash, KeyPair, PublicKey, Signature};

/// Runs one transaction type against a state view. Implementations validate
/// everything before their first mutation, so a rejection leaves the view
/// untouched.
pub(crate) trait Handler {
    fn run(
        &self,
        tx: &Transaction,
        sender: Address,
        state: &mut State,
        ctx: &mut Context,
    ) -> Result<Vec<Tag>, TxError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxData {
    Send(send::SendData),
    SellCoin(sell_coin::SellCoinData),
    DeclareCandidacy(declare_candidacy::DeclareCandidacyData),
    Delegate(delegate::DelegateData),
    Unbond(unbond::UnbondData),
    EditCandidate(edit_candidate::EditCandidateData),
    SetCandidateOnline(set_candidate_status::SetCandidateOnlineData),
    SetCandidateOffline(set_candidate_status::SetCandidateOfflineData),
    RedeemCheck(redeem_check::RedeemCheckData),
}

impl TxData {
    /// Fixed gas cost of the transaction type.
    pub fn gas(&self) -> u64 {
        match self {
            Self::Send(_) => send::GAS,
            Self::SellCoin(_) => sell_coin::GAS,
            Self::DeclareCandidacy(_) => declare_candidacy::GAS,
            Self::Delegate(_) => delegate::GAS,
            Self::Unbond(_) => unbond::GAS,
            Self::EditCandidate(_) => edit_candidate::GAS,
            Self::SetCandidateOnline(_) | Self::SetCandidateOffline(_) => {
                set_candidate_status::GAS
            }
            Self::RedeemCheck(_) => redeem_check::GAS,
        }
    }

    /// One-byte type tag reported in `tx.type`.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Send(_) => 0x01,
            Self::SellCoin(_) => 0x02,
            Self::DeclareCandidacy(_) => 0x06,
            Self::Delegate(_) => 0x07,
            Self::Unbond(_) => 0x08,
            Self::RedeemCheck(_) => 0x09,
            Self::SetCandidateOnline(_) => 0x0A,
            Self::SetCandidateOffline(_) => 0x0B,
            Self::EditCandidate(_) => 0x0E,
        }
    }

    pub(crate) fn handler(&self) -> &dyn Handler {
        match self {
            Self::Send(data) => data,
            Self::SellCoin(data) => data,
            Self::DeclareCandidacy(data) => data,
            Self::Delegate(data) => data,
            Self::Unbond(data) => data,
            Self::EditCandidate(data) => data,
            Self::SetCandidateOnline(data) => data,
            Self::SetCandidateOffline(data) => data,
            Self::RedeemCheck(data) => data,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// The signed transaction envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u64,
    pub chain_id: ChainId,
    pub gas_price: u32,
    pub gas_coin: CoinId,
    pub data: TxData,
    pub payload: Vec<u8>,
    pub signature: SignatureData,
}

/// Everything the sender signs.
#[derive(Serialize)]
struct Unsigned<'a> {
    nonce: u64,
    chain_id: ChainId,
    gas_price: u32,
    gas_coin: CoinId,
    data: &'a TxData,
    payload: &'a [u8],
}

impl Transaction {
    /// An unsigned transaction with gas price 1 and no payload.
    pub fn new(nonce: u64, chain_id: ChainId, gas_coin: CoinId, data: TxData) -> Self {
        Self {
            nonce,
            chain_id,
            gas_price: 1,
            gas_coin,
            data,
            payload: Vec::new(),
            signature: SignatureData {
                public_key: PublicKey::default(),
                signature: Signature([0u8; 64]),
            },
        }
    }

    /// Blake2b-256 of the envelope without its signature.
    pub fn signing_hash(&self) -> Result<Hash, TxError> {
        let unsigned = Unsigned {
            nonce: self.nonce,
            chain_id: self.chain_id,
            gas_price: self.gas_price,
            gas_coin: self.gas_coin,
            data: &self.data,
            payload: &self.payload,
        };
        let bytes = bincode::serialize(&unsigned).map_err(|e| TxError::Encode(e.to_string()))?;
        Ok(Hash::new(strata_crypto::blake2b_256(&bytes)))
    }

    pub fn sign(mut self, keys: &KeyPair) -> Result<Self, TxError> {
        let hash = self.signing_hash()?;
        self.signature = SignatureData {
            public_key: keys.public,
            signature: strata_crypto::sign_message(hash.as_bytes(), &keys.private),
        };
        Ok(self)
    }

    pub fn verify_signature(&self) -> Result<bool, TxError> {
        let hash = self.signing_hash()?;
        Ok(strata_crypto::verify_signature(
            hash.as_bytes(),
            &self.signature.signature,
            &self.signature.public_key,
        ))
    }

    pub fn sender(&self) -> Address {
        strata_crypto::derive_address(&self.signature.public_key)
    }

    pub fn gas(&self) -> u64 {
        self.data.gas()
    }

    pub fn encode(&self) -> Result<Vec<u8>, TxError> {
        bincode::serialize(self).map_err(|e| TxError::Encode(e.to_string()))
    }

    /// Decode wire bytes, rejecting anything that does not re-encode to the
    /// same bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        let tx: Self = bincode::deserialize(bytes).map_err(|e| {
            TxError::reject(Code::DecodeError, format!("cannot decode transaction: {e}"), serde_json::Value::Null)
        })?;
        if tx.encode()? != bytes {
            return Err(TxError::reject(
                Code::DecodeError,
                "non-canonical transaction encoding",
                serde_json::Value::Null,
            ));
        }
        Ok(tx)
    }

    /// Blake2b-256 of the encoded transaction.
    pub fn hash(&self) -> Result<Hash, TxError> {
        Ok(Hash::new(strata_crypto::blake2b_256(&self.encode()?)))
    }
}
