//! Coin identity: numeric id plus a ticker symbol.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Numeric coin identifier. Id `0` is the base coin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct CoinId(pub u32);

impl CoinId {
    pub const BASE: Self = Self(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn is_base_coin(&self) -> bool {
        *self == Self::BASE
    }

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coin ticker: 3 to 10 upper-case ASCII letters or digits.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoinSymbol(String);

impl CoinSymbol {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 10;

    /// Validate and wrap a ticker.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let valid_len = (Self::MIN_LEN..=Self::MAX_LEN).contains(&s.len());
        let valid_chars = s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid_len || !valid_chars {
            return Err(TypesError::InvalidCoinSymbol(s));
        }
        Ok(Self(s))
    }

    /// The symbol of the base coin.
    pub fn base() -> Self {
        Self(crate::params::BASE_COIN_SYMBOL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_validation() {
        assert!(CoinSymbol::new("TEST").is_ok());
        assert!(CoinSymbol::new("ABC123").is_ok());
        assert!(CoinSymbol::new("ab").is_err());
        assert!(CoinSymbol::new("lower").is_err());
        assert!(CoinSymbol::new("WAYTOOLONGSYMBOL").is_err());
    }

    #[test]
    fn base_coin_identity() {
        assert!(CoinId::BASE.is_base_coin());
        assert!(!CoinId::new(1).is_base_coin());
        assert_eq!(CoinSymbol::base().as_str(), "BIP");
    }
}
