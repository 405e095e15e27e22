//! Protocol constants every node must agree on.
//!
//! Changing any of these values changes consensus: two nodes with different
//! constants compute different state roots for the same block.

use crate::amount::bip_to_pip;

/// Ticker of the base coin.
pub const BASE_COIN_SYMBOL: &str = "BIP";

/// Blocks a stake stays frozen after unbonding or slashing.
pub const UNBOND_PERIOD: u64 = 518_400;

/// Maximum number of stakes one candidate may hold.
pub const MAX_DELEGATORS_PER_CANDIDATE: usize = 1000;

/// Multiplier that turns `gas_price * gas` into pip of the base coin.
pub const COMMISSION_MULTIPLIER: u128 = 1_000_000_000_000_000;

/// Minimum reserve a coin must keep after any sale.
pub const MIN_COIN_RESERVE: u128 = bip_to_pip(10_000);

/// Largest supply a coin may ever be created with.
pub const MAX_COIN_SUPPLY: u128 = bip_to_pip(1_000_000_000_000_000);

/// Slash penalty, percent of every stake of a byzantine validator.
pub const SLASH_PERCENT: u128 = 5;

/// Default block gas limit.
pub const DEFAULT_MAX_GAS: u64 = 100_000;

/// Maximum encoded transaction size in bytes.
pub const MAX_TX_LENGTH: usize = 32 * 1024;

/// Maximum transaction payload size in bytes.
pub const MAX_PAYLOAD_LENGTH: usize = 1024;

/// Maximum check nonce length in bytes.
pub const MAX_CHECK_NONCE_LENGTH: usize = 16;

/// Lowest allowed constant reserve ratio (percent).
pub const MIN_CRR: u32 = 10;

/// Highest allowed constant reserve ratio (percent).
pub const MAX_CRR: u32 = 100;

/// Swap pool fee, in thousandths of the input amount.
pub const SWAP_FEE_PER_MILLE: u128 = 2;
