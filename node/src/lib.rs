//! Strata node facade.
//!
//! Drives the state-transition engine the way a consensus engine would:
//! - `Blockchain`: genesis, the per-block lifecycle and mempool admission
//! - read queries: estimates, historical views, gas limits, mempool stats
//! - `Manager`: state export and pruning off the block path
//! - ambient pieces: configuration, logging, metrics

pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod mempool;
pub mod metrics;
mod query;
pub mod tracing_spans;

pub use blockchain::{BeginBlock, Blockchain, EndBlock, ValidatorUpdate};
pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use manager::{Manager, Status};
pub use mempool::{Mempool, UnconfirmedTxs};
pub use metrics::NodeMetrics;
