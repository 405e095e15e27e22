//! Chain identifier.

use serde::{Deserialize, Serialize};

/// Identifies which chain a transaction or check was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    /// The production network.
    Mainnet,
    /// The public test network.
    Testnet,
}

impl ChainId {
    /// Single-byte wire tag.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 2,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}
