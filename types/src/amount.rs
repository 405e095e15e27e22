//! Token amounts.
//!
//! Amounts are plain `u128` integers of the smallest unit (pip) to avoid
//! floating-point errors. 1 BIP = 10^18 pip.

/// Number of pip in one whole coin.
pub const PIP_PER_BIP: u128 = 1_000_000_000_000_000_000;

/// Convert a whole-coin amount to pip.
///
/// Saturates at `u128::MAX`, which is far above every supply cap.
pub const fn bip_to_pip(bip: u128) -> u128 {
    bip.saturating_mul(PIP_PER_BIP)
}
