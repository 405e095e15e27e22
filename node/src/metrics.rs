//! Prometheus metrics for the Strata node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`]; [`NodeMetrics::encode`]
//! renders it in the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::NodeError;

pub struct NodeMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub blocks_committed: IntCounter,
    pub txs_delivered: IntCounter,
    /// Delivered transactions answered with a non-zero code.
    pub txs_rejected: IntCounter,
    pub frozen_funds_released: IntCounter,
    /// Stake positions slashed for byzantine behaviour.
    pub slashes: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub height: IntGauge,
    pub mempool_size: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    pub commit_latency_ms: Histogram,
}

impl NodeMetrics {
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let blocks_committed = register_int_counter_with_registry!(
            Opts::new("strata_blocks_committed_total", "Blocks committed"),
            registry
        )?;
        let txs_delivered = register_int_counter_with_registry!(
            Opts::new("strata_txs_delivered_total", "Transactions delivered in blocks"),
            registry
        )?;
        let txs_rejected = register_int_counter_with_registry!(
            Opts::new(
                "strata_txs_rejected_total",
                "Delivered transactions rejected with a non-zero code"
            ),
            registry
        )?;
        let frozen_funds_released = register_int_counter_with_registry!(
            Opts::new("strata_frozen_funds_released_total", "Frozen funds paid out"),
            registry
        )?;
        let slashes = register_int_counter_with_registry!(
            Opts::new("strata_slashes_total", "Stake positions slashed"),
            registry
        )?;

        let height = register_int_gauge_with_registry!(
            Opts::new("strata_height", "Height of the last committed block"),
            registry
        )?;
        let mempool_size = register_int_gauge_with_registry!(
            Opts::new("strata_mempool_size", "Transactions waiting in the mempool"),
            registry
        )?;

        // 0.1 ms to ~1.6 s.
        let commit_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new("strata_commit_latency_ms", "Block commit time in milliseconds")
                .buckets(prometheus::exponential_buckets(0.1, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            blocks_committed,
            txs_delivered,
            txs_rejected,
            frozen_funds_released,
            slashes,
            height,
            mempool_size,
            commit_latency_ms,
        })
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| NodeError::Encode(e.to_string()))
    }
}
