//! Key layout of the state tree.
//!
//! Every key starts with a one-byte tag naming the sub-state that owns it.
//! Integer components are big-endian so ascending key order matches
//! ascending numeric order.

use strata_types::{Address, CoinId, CoinSymbol, Hash, PublicKey};

pub const APP_PREFIX: u8 = b'p';
pub const ACCOUNT_PREFIX: u8 = b'a';
pub const COIN_PREFIX: u8 = b'q';
pub const SYMBOL_PREFIX: u8 = b'y';
pub const CANDIDATE_PREFIX: u8 = b'c';
pub const FROZEN_FUNDS_PREFIX: u8 = b'f';
pub const CHECK_PREFIX: u8 = b'k';
pub const SWAP_PREFIX: u8 = b'w';

const STAKE_HEADER_TAG: u8 = b'q';
const STAKE_NODE_TAG: u8 = b's';
const TOTAL_STAKE_TAG: u8 = b't';

pub fn app() -> Vec<u8> {
    vec![APP_PREFIX]
}

pub fn account(address: &Address) -> Vec<u8> {
    prefixed(ACCOUNT_PREFIX, address.as_bytes())
}

pub fn coin(id: CoinId) -> Vec<u8> {
    prefixed(COIN_PREFIX, &id.to_be_bytes())
}

pub fn coin_symbol(symbol: &CoinSymbol) -> Vec<u8> {
    prefixed(SYMBOL_PREFIX, symbol.as_str().as_bytes())
}

/// The candidate list lives under the bare tag.
pub fn candidates_root() -> Vec<u8> {
    vec![CANDIDATE_PREFIX]
}

pub fn stake_header(pubkey: &PublicKey) -> Vec<u8> {
    let mut key = prefixed(CANDIDATE_PREFIX, pubkey.as_bytes());
    key.push(STAKE_HEADER_TAG);
    key
}

pub fn stake_node(pubkey: &PublicKey, index: u32) -> Vec<u8> {
    let mut key = prefixed(CANDIDATE_PREFIX, pubkey.as_bytes());
    key.push(STAKE_NODE_TAG);
    key.extend_from_slice(&index.to_be_bytes());
    key
}

pub fn total_stake(pubkey: &PublicKey) -> Vec<u8> {
    let mut key = prefixed(CANDIDATE_PREFIX, pubkey.as_bytes());
    key.push(TOTAL_STAKE_TAG);
    key
}

pub fn frozen_funds(height: u64) -> Vec<u8> {
    prefixed(FROZEN_FUNDS_PREFIX, &height.to_be_bytes())
}

pub fn used_check(hash: &Hash) -> Vec<u8> {
    prefixed(CHECK_PREFIX, hash.as_bytes())
}

/// Pools are keyed by the ordered pair `(min id, max id)`.
pub fn swap_pool(a: CoinId, b: CoinId) -> Vec<u8> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut key = prefixed(SWAP_PREFIX, &lo.to_be_bytes());
    key.extend_from_slice(&hi.to_be_bytes());
    key
}

/// Read the release height back out of a frozen-funds key.
pub fn frozen_funds_height(key: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = key.get(1..9)?.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

fn prefixed(tag: u8, rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + rest.len());
    key.push(tag);
    key.extend_from_slice(rest);
    key
}
