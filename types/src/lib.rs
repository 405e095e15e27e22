//! Fundamental types for the Strata state machine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, public keys, coin identities, amounts, chain identifiers and the
//! protocol constants that every node must agree on.

pub mod address;
pub mod amount;
pub mod coin;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod params;

pub use address::{Address, TmAddress};
pub use amount::{bip_to_pip, PIP_PER_BIP};
pub use coin::{CoinId, CoinSymbol};
pub use error::TypesError;
pub use hash::Hash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::ChainId;
