//! Blake2b-256 and SHA-256 digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha2::Sha256;

type Blake2b256 = Blake2b<U32>;

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize()[..32]);
    out
}

/// Blake2b-256 of `data`. Transaction, check and root hashes all use it.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    digest_parts::<Blake2b256>(&[data])
}

/// Blake2b-256 over the concatenation of `parts`, without building it.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    digest_parts::<Blake2b256>(parts)
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    digest_parts::<Sha256>(&[data])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_part_matches_concatenation() {
        assert_eq!(
            blake2b_256(b"checkredeemer"),
            blake2b_256_multi(&[b"check", b"redeemer"])
        );
        assert_ne!(blake2b_256(b"check"), blake2b_256(b"redeemer"));
    }

    #[test]
    fn sha256_known_vector() {
        let digest = sha256(b"abc");
        assert_eq!(&digest[..4], &[0xba, 0x78, 0x16, 0xbf]);
        assert_eq!(digest[31], 0xad);
    }
}
