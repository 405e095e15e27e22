//! Ed25519 key pairs for accounts, candidates and check locks.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use strata_types::{KeyPair, PrivateKey, PublicKey};

use crate::hash::sha256;

fn from_signing_key(key: SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(key.verifying_key().to_bytes()),
        private: PrivateKey(key.to_bytes()),
    }
}

/// Fresh account key pair from the OS random source.
pub fn generate_keypair() -> KeyPair {
    from_signing_key(SigningKey::generate(&mut OsRng))
}

/// Deterministic key pair whose secret scalar is `seed`.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    from_signing_key(SigningKey::from_bytes(seed))
}

/// Key pair that locks a check: seeded with the SHA-256 of the passphrase,
/// so issuer and redeemer derive the same key independently.
pub fn lock_keypair(passphrase: &str) -> KeyPair {
    keypair_from_seed(&sha256(passphrase.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_differ() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.public, b.public);
        assert_eq!(keypair_from_seed(&a.private.0).public, a.public);
    }

    #[test]
    fn seeded_keys_are_stable() {
        assert_eq!(
            keypair_from_seed(&[42; 32]).public,
            keypair_from_seed(&[42; 32]).public
        );
        assert_ne!(
            keypair_from_seed(&[42; 32]).public,
            keypair_from_seed(&[43; 32]).public
        );
    }

    #[test]
    fn lock_key_depends_only_on_passphrase() {
        assert_eq!(lock_keypair("open sesame").public, lock_keypair("open sesame").public);
        assert_ne!(lock_keypair("open sesame").public, lock_keypair("Open sesame").public);
    }
}
