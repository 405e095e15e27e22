//! Manager service: out-of-band jobs over committed history.
//!
//! Jobs read immutable past versions on tokio's blocking pool, so they never
//! hold up block delivery.

use std::sync::Arc;

use serde::Serialize;
use strata_state::{GenesisState, State};
use strata_store::{MutableTree, StoreError};
use strata_types::Hash;
use tracing::Instrument;

use crate::tracing_spans::manager_span;
use crate::NodeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Status {
    pub latest_height: u64,
    pub latest_hash: Hash,
    /// Oldest height still readable, if any block was committed.
    pub oldest_height: Option<u64>,
    pub stored_states: usize,
}

#[derive(Clone)]
pub struct Manager {
    tree: Arc<dyn MutableTree>,
    base_height: u64,
}

impl Manager {
    pub fn new(tree: Arc<dyn MutableTree>, base_height: u64) -> Self {
        Self { tree, base_height }
    }

    fn stored_heights(tree: &dyn MutableTree, base_height: u64) -> Vec<u64> {
        tree.available_versions()
            .into_iter()
            .filter(|v| *v > 0)
            .map(|v| base_height + v)
            .collect()
    }

    /// Export the state at every height in `from..=to` as a genesis
    /// document.
    pub async fn export_states(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<(u64, GenesisState)>, NodeError> {
        if from > to || from <= self.base_height {
            return Err(NodeError::InvalidRange { from, to });
        }
        let tree = Arc::clone(&self.tree);
        let base_height = self.base_height;
        let span = manager_span("export_states", from, to);
        tokio::task::spawn_blocking(move || -> Result<Vec<(u64, GenesisState)>, NodeError> {
            let _entered = span.entered();
            let mut out = Vec::new();
            for height in from..=to {
                let mut state = State::at_height(tree.as_ref(), height - base_height)
                    .map_err(|_| NodeError::HeightNotAvailable(height))?;
                out.push((height, state.export()?));
            }
            tracing::info!(exported = out.len(), "states exported");
            Ok(out)
        })
        .await?
    }

    /// Delete stored heights in `from..=to`. The latest height is always
    /// kept. Returns the heights removed.
    pub async fn prune_states(&self, from: u64, to: u64) -> Result<Vec<u64>, NodeError> {
        if from > to {
            return Err(NodeError::InvalidRange { from, to });
        }
        let tree = Arc::clone(&self.tree);
        let base_height = self.base_height;
        let span = manager_span("prune_states", from, to);
        tokio::task::spawn_blocking(move || -> Result<Vec<u64>, NodeError> {
            let _entered = span.entered();
            let latest = tree.version();
            let mut pruned = Vec::new();
            for height in Self::stored_heights(tree.as_ref(), base_height) {
                let version = height - base_height;
                if height < from || height > to || version == latest {
                    continue;
                }
                match tree.delete_version(version) {
                    Ok(()) => pruned.push(height),
                    Err(StoreError::VersionNotFound(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            tracing::info!(pruned = pruned.len(), "states pruned");
            Ok(pruned)
        })
        .await?
    }

    /// Keep only the newest `keep` heights. Zero keeps everything.
    pub async fn prune_to_window(&self, keep: u64) -> Result<Vec<u64>, NodeError> {
        let latest = self.base_height + self.tree.version();
        match latest.checked_sub(keep) {
            Some(to) if keep > 0 && to > self.base_height => {
                self.prune_states(self.base_height + 1, to)
                    .instrument(tracing::debug_span!("window", keep))
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }

    pub async fn status(&self) -> Result<Status, NodeError> {
        let latest = self.tree.latest()?;
        let heights = Self::stored_heights(self.tree.as_ref(), self.base_height);
        Ok(Status {
            latest_height: self.base_height + latest.version(),
            latest_hash: latest.hash(),
            oldest_height: heights.first().copied(),
            stored_states: heights.len(),
        })
    }
}
