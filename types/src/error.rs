use thiserror::Error;

/// Errors raised while parsing or validating primitive types.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid coin symbol: {0}")]
    InvalidCoinSymbol(String),
}
