//! Bearer checks.
//!
//! An issuer signs a check for a fixed value; anyone who knows the check's
//! passphrase can redeem it once before `due_block`. The passphrase derives
//! the lock key pair: the lock key signs the check body, and the redeemer
//! proves knowledge of it by signing the Blake2b hash of their own address,
//! which binds the proof to one redeemer.

use serde::{Deserialize, Serialize};
use strata_types::{Address, ChainId, CoinId, Hash, KeyPair, PrivateKey, PublicKey, Signature};

use crate::code::Code;
use crate::error::TxError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub nonce: Vec<u8>,
    pub chain_id: ChainId,
    pub due_block: u64,
    pub coin: CoinId,
    pub value: u128,
    pub gas_coin: CoinId,
    pub lock: PublicKey,
    /// Lock key's signature over the body.
    pub lock_signature: Signature,
    pub issuer: PublicKey,
    /// Issuer's signature over the body and the lock.
    pub signature: Signature,
}

#[derive(Serialize)]
struct Body<'a> {
    nonce: &'a [u8],
    chain_id: ChainId,
    due_block: u64,
    coin: CoinId,
    value: u128,
    gas_coin: CoinId,
}

#[derive(Serialize)]
struct Locked<'a> {
    body: Hash,
    lock: &'a PublicKey,
    lock_signature: &'a Signature,
    issuer: &'a PublicKey,
}

fn digest<T: Serialize>(value: &T) -> Result<Hash, TxError> {
    let bytes = bincode::serialize(value).map_err(|e| TxError::Encode(e.to_string()))?;
    Ok(Hash::new(strata_crypto::blake2b_256(&bytes)))
}

fn decode_error(log: impl Into<String>) -> TxError {
    TxError::reject(Code::DecodeError, log, serde_json::Value::Null)
}

impl Check {
    /// An unsigned check; call `lock` and then `sign`.
    pub fn new(
        nonce: Vec<u8>,
        chain_id: ChainId,
        due_block: u64,
        coin: CoinId,
        value: u128,
        gas_coin: CoinId,
    ) -> Self {
        Self {
            nonce,
            chain_id,
            due_block,
            coin,
            value,
            gas_coin,
            lock: PublicKey::default(),
            lock_signature: Signature([0u8; 64]),
            issuer: PublicKey::default(),
            signature: Signature([0u8; 64]),
        }
    }

    /// Lock key pair derived from a passphrase.
    pub fn lock_keys(passphrase: &str) -> KeyPair {
        strata_crypto::lock_keypair(passphrase)
    }

    /// Hash of the fields the lock key signs.
    pub fn body_hash(&self) -> Result<Hash, TxError> {
        digest(&Body {
            nonce: &self.nonce,
            chain_id: self.chain_id,
            due_block: self.due_block,
            coin: self.coin,
            value: self.value,
            gas_coin: self.gas_coin,
        })
    }

    /// Hash the issuer signs.
    pub fn signing_hash(&self) -> Result<Hash, TxError> {
        digest(&Locked {
            body: self.body_hash()?,
            lock: &self.lock,
            lock_signature: &self.lock_signature,
            issuer: &self.issuer,
        })
    }

    pub fn lock(mut self, lock_keys: &KeyPair) -> Result<Self, TxError> {
        let body = self.body_hash()?;
        self.lock = lock_keys.public;
        self.lock_signature = strata_crypto::sign_message(body.as_bytes(), &lock_keys.private);
        Ok(self)
    }

    pub fn sign(mut self, issuer: &KeyPair) -> Result<Self, TxError> {
        self.issuer = issuer.public;
        let hash = self.signing_hash()?;
        self.signature = strata_crypto::sign_message(hash.as_bytes(), &issuer.private);
        Ok(self)
    }

    /// The issuer's address, if the issuer signature verifies.
    pub fn issuer_address(&self) -> Result<Address, TxError> {
        let hash = self.signing_hash()?;
        if !strata_crypto::verify_signature(hash.as_bytes(), &self.signature, &self.issuer) {
            return Err(decode_error("invalid issuer signature"));
        }
        Ok(strata_crypto::derive_address(&self.issuer))
    }

    pub fn verify_lock(&self) -> Result<bool, TxError> {
        let body = self.body_hash()?;
        Ok(strata_crypto::verify_signature(
            body.as_bytes(),
            &self.lock_signature,
            &self.lock,
        ))
    }

    /// Redeemer's proof: the lock key's signature over `Blake2b(redeemer)`.
    pub fn proof(lock_key: &PrivateKey, redeemer: &Address) -> Signature {
        let hash = strata_crypto::blake2b_256(redeemer.as_bytes());
        strata_crypto::sign_message(&hash, lock_key)
    }

    pub fn verify_proof(&self, proof: &Signature, redeemer: &Address) -> bool {
        let hash = strata_crypto::blake2b_256(redeemer.as_bytes());
        strata_crypto::verify_signature(&hash, proof, &self.lock)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TxError> {
        bincode::serialize(self).map_err(|e| TxError::Encode(e.to_string()))
    }

    /// Decode check bytes; only the canonical encoding is accepted, so the
    /// replay hash of a check cannot be changed by re-encoding it.
    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        if bytes.is_empty() {
            return Err(decode_error("empty check"));
        }
        let check: Self = bincode::deserialize(bytes)
            .map_err(|e| decode_error(format!("cannot decode check: {e}")))?;
        if check.encode()? != bytes {
            return Err(decode_error("non-canonical check encoding"));
        }
        Ok(check)
    }

    /// Replay identity: Blake2b-256 of the encoded check.
    pub fn hash(&self) -> Result<Hash, TxError> {
        Ok(Hash::new(strata_crypto::blake2b_256(&self.encode()?)))
    }
}
