//! Block lifecycle facade driven by the consensus engine.
//!
//! Call order per block: `begin_block`, any number of `deliver_tx`,
//! `end_block`, `commit`. `check_tx` may be called at any time and runs
//! against a separate overlay that is rebuilt after every commit.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;
use strata_nullables::MemTree;
use strata_state::{GenesisState, Slash, State};
use strata_store::MutableTree;
use strata_transactions::{run_tx, Code, Context, Response, Transaction};
use strata_types::{Hash, PublicKey, TmAddress};

use crate::config::NodeConfig;
use crate::manager::Manager;
use crate::mempool::Mempool;
use crate::metrics::NodeMetrics;
use crate::tracing_spans::block_span;
use crate::NodeError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BeginBlock {
    /// Frozen funds paid out at this height.
    pub released: usize,
    pub slashes: Vec<Slash>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidatorUpdate {
    pub pub_key: PublicKey,
    /// Total stake in base coin.
    pub power: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EndBlock {
    /// Online candidates with the largest stakes, at most
    /// `validators_count`, largest first.
    pub validators: Vec<ValidatorUpdate>,
    /// Stakes returned to their owners by the recalculation.
    pub refunds: usize,
    /// Base-coin commission collected in this block.
    pub reward_pool: u128,
    pub gas_used: u64,
}

struct Block {
    ctx: Context,
    gas_used: u64,
}

pub struct Blockchain {
    config: NodeConfig,
    tree: Arc<dyn MutableTree>,
    deliver: State,
    check: State,
    check_ctx: Context,
    /// Height the genesis document was exported at; tree version `v` holds
    /// block `base_height + v`.
    base_height: u64,
    /// Last committed height.
    height: u64,
    initialized: bool,
    block: Option<Block>,
    mempool: Mempool,
    metrics: Option<NodeMetrics>,
}

impl Blockchain {
    /// Open a chain over `tree`, resuming from its latest version.
    pub fn new(tree: Arc<dyn MutableTree>, config: NodeConfig) -> Result<Self, NodeError> {
        let mut deliver = State::new_deliver(Arc::clone(&tree))?;
        let version = tree.version();
        let (initialized, height) = if version == 0 {
            (false, 0)
        } else {
            (true, deliver.app.height()?)
        };
        let base_height = height.saturating_sub(version);
        let check = State::new_check(tree.as_ref())?;
        let check_ctx = Context::new(
            config.chain_id,
            height.saturating_add(1),
            config.validators_count,
        );
        let metrics = if config.enable_metrics {
            Some(NodeMetrics::new()?)
        } else {
            None
        };
        if initialized {
            tracing::info!(height, version, "resuming chain");
        }
        Ok(Self {
            config,
            tree,
            deliver,
            check,
            check_ctx,
            base_height,
            height,
            initialized,
            block: None,
            mempool: Mempool::new(),
            metrics,
        })
    }

    /// A chain over a fresh in-memory tree.
    pub fn in_memory(config: NodeConfig) -> Result<Self, NodeError> {
        Self::new(Arc::new(MemTree::new()), config)
    }

    /// Load the genesis document. It is written together with the first
    /// block, at height `genesis.app.height + 1`.
    pub fn init_chain(&mut self, genesis: &GenesisState) -> Result<(), NodeError> {
        if self.initialized {
            return Err(NodeError::AlreadyInitialized(self.height));
        }
        self.deliver.import(genesis)?;
        if genesis.app.max_gas == 0 {
            self.deliver.app.set_max_gas(self.config.max_gas)?;
        }
        self.base_height = genesis.app.height;
        self.height = genesis.app.height;
        self.check_ctx.height = self.height.saturating_add(1);
        self.initialized = true;
        tracing::info!(
            chain_id = self.config.chain_id.as_str(),
            initial_height = self.height + 1,
            "chain initialised"
        );
        Ok(())
    }

    /// Open block `height`: pay out frozen funds due now and punish the
    /// validators named in `byzantine`.
    pub fn begin_block(
        &mut self,
        height: u64,
        byzantine: &[TmAddress],
    ) -> Result<BeginBlock, NodeError> {
        let _span = block_span("begin_block", height).entered();
        if !self.initialized {
            return Err(NodeError::NotInitialized);
        }
        let expected = self.height + 1;
        if self.block.is_some() || height != expected {
            return Err(NodeError::UnexpectedHeight {
                expected,
                got: height,
            });
        }

        self.deliver.app.set_height(height)?;
        let released = self
            .deliver
            .frozen_funds
            .release(height, &mut self.deliver.accounts)?
            .len();

        let mut slashes = Vec::new();
        for address in byzantine {
            let (candidates, mut bus) = self.deliver.candidates_and_bus();
            slashes.extend(candidates.punish_byzantine(height, address, &mut bus)?);
        }

        if let Some(metrics) = &self.metrics {
            metrics.frozen_funds_released.inc_by(released as u64);
            metrics.slashes.inc_by(slashes.len() as u64);
        }
        self.block = Some(Block {
            ctx: Context::new(self.config.chain_id, height, self.config.validators_count),
            gas_used: 0,
        });
        tracing::debug!(released, slashed = slashes.len(), "block started");
        Ok(BeginBlock { released, slashes })
    }

    /// Apply one transaction of the open block.
    pub fn deliver_tx(&mut self, raw: &[u8]) -> Result<Response, NodeError> {
        let block = self.block.as_mut().ok_or(NodeError::NoBlockInProgress)?;
        let decoded = Transaction::decode(raw).ok();

        let max_gas = self.deliver.app.max_gas()?;
        let response = match &decoded {
            Some(tx) if block.gas_used.saturating_add(tx.gas()) > max_gas => Response::reject(
                Code::BlockGasLimitReached,
                "block gas limit reached",
                json!({ "block_gas_used": block.gas_used, "max_gas": max_gas, "tx_gas": tx.gas() }),
            ),
            _ => run_tx(&mut self.deliver, raw, &mut block.ctx)?,
        };
        if response.is_ok() {
            block.gas_used += response.gas_used;
        }

        if let Some(hash) = decoded.and_then(|tx| tx.hash().ok()) {
            self.mempool.remove(&hash);
        }
        if let Some(metrics) = &self.metrics {
            metrics.txs_delivered.inc();
            if !response.is_ok() {
                metrics.txs_rejected.inc();
            }
            metrics.mempool_size.set(self.mempool.len() as i64);
        }
        Ok(response)
    }

    /// Close the open block: apply pending delegations and report the new
    /// validator set.
    pub fn end_block(&mut self) -> Result<EndBlock, NodeError> {
        let block = self.block.as_ref().ok_or(NodeError::NoBlockInProgress)?;
        let _span = block_span("end_block", block.ctx.height).entered();

        let (candidates, mut bus) = self.deliver.candidates_and_bus();
        let refunds = candidates.recalculate_stakes(&mut bus)?.len();

        let mut validators = Vec::new();
        for candidate in self.deliver.candidates.get_candidates()? {
            if !candidate.is_online() {
                continue;
            }
            let power = self.deliver.candidates.get_total_stake(&candidate.pubkey)?;
            if power > 0 {
                validators.push(ValidatorUpdate {
                    pub_key: candidate.pubkey,
                    power,
                });
            }
        }
        validators.sort_by(|a, b| b.power.cmp(&a.power).then(a.pub_key.cmp(&b.pub_key)));
        validators.truncate(self.config.validators_count);

        Ok(EndBlock {
            validators,
            refunds,
            reward_pool: block.ctx.reward_pool,
            gas_used: block.gas_used,
        })
    }

    /// Persist the block and rebuild the mempool overlay. Returns the new
    /// root hash.
    pub fn commit(&mut self) -> Result<Hash, NodeError> {
        let block = self.block.take().ok_or(NodeError::NoBlockInProgress)?;
        let height = block.ctx.height;
        let _span = block_span("commit", height).entered();
        let started = Instant::now();

        let (hash, version) = self.deliver.commit()?;
        self.height = height;

        self.check = State::new_check(self.tree.as_ref())?;
        self.check_ctx = Context::new(
            self.config.chain_id,
            height + 1,
            self.config.validators_count,
        );
        let pending = self.mempool.drain();
        let mut dropped = 0usize;
        for (tx_hash, raw) in pending {
            if run_tx(&mut self.check, &raw, &mut self.check_ctx)?.is_ok() {
                self.mempool.insert(tx_hash, raw);
            } else {
                dropped += 1;
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.blocks_committed.inc();
            metrics.height.set(height as i64);
            metrics.mempool_size.set(self.mempool.len() as i64);
            metrics
                .commit_latency_ms
                .observe(started.elapsed().as_secs_f64() * 1000.0);
        }
        tracing::info!(
            version,
            %hash,
            gas_used = block.gas_used,
            mempool = self.mempool.len(),
            dropped,
            "block committed"
        );
        Ok(hash)
    }

    /// Mempool admission. Accepted transactions mutate the overlay, so a
    /// second transaction from the same sender must carry the next nonce.
    pub fn check_tx(&mut self, raw: &[u8]) -> Result<Response, NodeError> {
        let response = run_tx(&mut self.check, raw, &mut self.check_ctx)?;
        if response.is_ok() {
            let tx = Transaction::decode(raw)?;
            self.mempool.insert(tx.hash()?, raw.to_vec());
            if let Some(metrics) = &self.metrics {
                metrics.mempool_size.set(self.mempool.len() as i64);
            }
        }
        Ok(response)
    }

    /// Last committed height.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Root hash of the last committed version.
    pub fn root_hash(&self) -> Hash {
        self.deliver.root_hash()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&NodeMetrics> {
        self.metrics.as_ref()
    }

    /// Out-of-band jobs over this chain's history.
    pub fn manager(&self) -> Manager {
        Manager::new(Arc::clone(&self.tree), self.base_height)
    }

    pub(crate) fn tree(&self) -> &dyn MutableTree {
        self.tree.as_ref()
    }

    pub(crate) fn base_height(&self) -> u64 {
        self.base_height
    }

    pub(crate) fn mempool(&self) -> &Mempool {
        &self.mempool
    }
}
