//! Address derivation from public keys.

use strata_types::{Address, PublicKey, TmAddress};

use crate::hash::{blake2b_256, sha256};

/// Derive an account address: the last 20 bytes of Blake2b-256(public key).
pub fn derive_address(public_key: &PublicKey) -> Address {
    let digest = blake2b_256(public_key.as_bytes());
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

/// Derive a validator's consensus address: the first 20 bytes of SHA-256(public key).
pub fn tm_address(public_key: &PublicKey) -> TmAddress {
    let digest = sha256(public_key.as_bytes());
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[..20]);
    TmAddress(out)
}
