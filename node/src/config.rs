//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use strata_types::params::DEFAULT_MAX_GAS;
use strata_types::ChainId;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a Strata node.
///
/// Loaded from a TOML file via [`NodeConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Chain transactions and checks must be signed for.
    #[serde(default = "default_chain_id")]
    pub chain_id: ChainId,

    /// Block gas limit written at genesis.
    #[serde(default = "default_max_gas")]
    pub max_gas: u64,

    /// Validator slots; a new candidate must outrank an existing one once
    /// they are all taken.
    #[serde(default = "default_validators_count")]
    pub validators_count: usize,

    /// Historical versions kept by the manager's pruning job. Zero keeps
    /// everything.
    #[serde(default = "default_keep_last_states")]
    pub keep_last_states: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to collect Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,
}

fn default_chain_id() -> ChainId {
    ChainId::Testnet
}

fn default_max_gas() -> u64 {
    DEFAULT_MAX_GAS
}

fn default_validators_count() -> usize {
    64
}

fn default_keep_last_states() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NodeError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), NodeError> {
        if self.max_gas == 0 {
            return Err(NodeError::Config("max_gas must be positive".to_string()));
        }
        if self.validators_count == 0 {
            return Err(NodeError::Config("validators_count must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            max_gas: default_max_gas(),
            validators_count: default_validators_count(),
            keep_last_states: default_keep_last_states(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            enable_metrics: false,
        }
    }
}
