use strata_state::StateError;
use strata_store::StoreError;
use strata_transactions::{Response, TxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A query was answered with a business rejection.
    #[error("rejected with code {}: {}", .0.code, .0.log)]
    Rejected(Box<Response>),

    #[error("failed to encode: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging already initialised: {0}")]
    Logging(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("chain is already initialised at height {0}")]
    AlreadyInitialized(u64),

    #[error("unexpected block height: expected {expected}, got {got}")]
    UnexpectedHeight { expected: u64, got: u64 },

    #[error("chain is not initialised")]
    NotInitialized,

    #[error("no block in progress")]
    NoBlockInProgress,

    #[error("height {0} is not available")]
    HeightNotAvailable(u64),

    #[error("invalid height range {from}..={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<TxError> for NodeError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Rejected(response) => Self::Rejected(response),
            TxError::State(e) => Self::State(e),
            TxError::Encode(e) => Self::Encode(e),
        }
    }
}
