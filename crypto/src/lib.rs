//! Cryptographic primitives for the Strata state machine.
//!
//! - **Ed25519** for transaction, check and proof signatures
//! - **Blake2b** for hashing (transaction hashes, check identities, root hashes)
//! - **SHA-256** for consensus addresses of validators
//! - Account address derivation from public keys

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{derive_address, tm_address};
pub use hash::{blake2b_256, blake2b_256_multi, sha256};
pub use keys::{generate_keypair, keypair_from_seed, lock_keypair};
pub use sign::{sign_message, verify_signature};
