//! The state container: one view over the versioned tree.

use std::sync::Arc;

use strata_store::{ImmutableTree, MutableTree, WriteBatch};
use strata_types::Hash;

use crate::accounts::Accounts;
use crate::app::App;
use crate::bus::Bus;
use crate::candidates::Candidates;
use crate::checks::Checks;
use crate::coins::Coins;
use crate::frozen_funds::FrozenFunds;
use crate::swap::Swap;
use crate::StateError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    /// Applies committed blocks; the only view that writes to the tree.
    Deliver,
    /// Mempool admission overlay; discarded after every commit.
    Check,
    /// Read-only view of a past version.
    Historical,
}

pub struct State {
    kind: ViewKind,
    tree: Option<Arc<dyn MutableTree>>,
    snapshot: Arc<dyn ImmutableTree>,
    pub app: App,
    pub accounts: Accounts,
    pub coins: Coins,
    pub candidates: Candidates,
    pub frozen_funds: FrozenFunds,
    pub checks: Checks,
    pub swap: Swap,
}

impl State {
    fn from_snapshot(
        kind: ViewKind,
        tree: Option<Arc<dyn MutableTree>>,
        snapshot: Arc<dyn ImmutableTree>,
    ) -> Self {
        Self {
            kind,
            tree,
            app: App::new(Arc::clone(&snapshot)),
            accounts: Accounts::new(Arc::clone(&snapshot)),
            coins: Coins::new(Arc::clone(&snapshot)),
            candidates: Candidates::new(Arc::clone(&snapshot)),
            frozen_funds: FrozenFunds::new(Arc::clone(&snapshot)),
            checks: Checks::new(Arc::clone(&snapshot)),
            swap: Swap::new(Arc::clone(&snapshot)),
            snapshot,
        }
    }

    /// The committable view over the latest saved version.
    pub fn new_deliver(tree: Arc<dyn MutableTree>) -> Result<Self, StateError> {
        let snapshot = tree.latest()?;
        Ok(Self::from_snapshot(ViewKind::Deliver, Some(tree), snapshot))
    }

    /// A speculative overlay over the latest saved version.
    pub fn new_check(tree: &dyn MutableTree) -> Result<Self, StateError> {
        Ok(Self::from_snapshot(ViewKind::Check, None, tree.latest()?))
    }

    /// A read-only view of the state committed at `height`.
    pub fn at_height(tree: &dyn MutableTree, height: u64) -> Result<Self, StateError> {
        let snapshot = tree.immutable_at(height)?;
        Ok(Self::from_snapshot(ViewKind::Historical, None, snapshot))
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Version of the snapshot this view reads from.
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }

    /// Root hash of the snapshot this view reads from.
    pub fn root_hash(&self) -> Hash {
        self.snapshot.hash()
    }

    /// Borrow the candidate ledger together with the sub-states it updates.
    pub fn candidates_and_bus(&mut self) -> (&mut Candidates, Bus<'_>) {
        (
            &mut self.candidates,
            Bus {
                app: &mut self.app,
                accounts: &mut self.accounts,
                coins: &mut self.coins,
                frozen_funds: &mut self.frozen_funds,
            },
        )
    }

    /// Write every dirty sub-state into the tree as one new version.
    ///
    /// On any failure the tree's working set is rolled back, so a height is
    /// either fully committed or not at all.
    pub fn commit(&mut self) -> Result<(Hash, u64), StateError> {
        let tree = match (self.kind, &self.tree) {
            (ViewKind::Deliver, Some(tree)) => Arc::clone(tree),
            _ => return Err(StateError::ReadOnly),
        };

        let mut batch = WriteBatch::new();
        self.app.flush(&mut batch)?;
        self.accounts.flush(&mut batch)?;
        self.coins.flush(&mut batch)?;
        self.candidates.flush(&mut batch)?;
        self.frozen_funds.flush(&mut batch)?;
        self.checks.flush(&mut batch);
        self.swap.flush(&mut batch)?;

        let saved = batch
            .apply(tree.as_ref())
            .and_then(|()| tree.save_version());
        let (hash, version) = match saved {
            Ok(saved) => saved,
            Err(e) => {
                tree.rollback();
                tracing::error!(error = %e, "commit failed, working set rolled back");
                return Err(e.into());
            }
        };

        let snapshot = tree.immutable_at(version)?;
        self.rebase(snapshot);
        tracing::debug!(version, %hash, writes = batch.len(), "state committed");
        Ok((hash, version))
    }

    fn rebase(&mut self, snapshot: Arc<dyn ImmutableTree>) {
        self.app.rebase(Arc::clone(&snapshot));
        self.accounts.rebase(Arc::clone(&snapshot));
        self.coins.rebase(Arc::clone(&snapshot));
        self.candidates.rebase(Arc::clone(&snapshot));
        self.frozen_funds.rebase(Arc::clone(&snapshot));
        self.checks.rebase(Arc::clone(&snapshot));
        self.swap.rebase(Arc::clone(&snapshot));
        self.snapshot = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_nullables::MemTree;
    use strata_types::{Address, CoinId};

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn deliver_commits_and_check_does_not() {
        let tree: Arc<dyn MutableTree> = Arc::new(MemTree::new());
        let mut deliver = State::new_deliver(Arc::clone(&tree)).unwrap();
        deliver.accounts.add_balance(&addr(1), CoinId::BASE, 10).unwrap();
        deliver.app.set_height(1).unwrap();
        let (_, version) = deliver.commit().unwrap();
        assert_eq!(version, 1);
        assert_eq!(deliver.version(), 1);

        let mut check = State::new_check(tree.as_ref()).unwrap();
        check.accounts.add_balance(&addr(1), CoinId::BASE, 5).unwrap();
        assert_eq!(check.accounts.get_balance(&addr(1), CoinId::BASE).unwrap(), 15);
        assert!(matches!(check.commit(), Err(StateError::ReadOnly)));

        let mut fresh = State::new_check(tree.as_ref()).unwrap();
        assert_eq!(fresh.accounts.get_balance(&addr(1), CoinId::BASE).unwrap(), 10);
    }

    #[test]
    fn historical_views_see_past_versions() {
        let tree: Arc<dyn MutableTree> = Arc::new(MemTree::new());
        let mut deliver = State::new_deliver(Arc::clone(&tree)).unwrap();
        deliver.accounts.add_balance(&addr(1), CoinId::BASE, 10).unwrap();
        deliver.commit().unwrap();
        deliver.accounts.add_balance(&addr(1), CoinId::BASE, 10).unwrap();
        deliver.commit().unwrap();

        let mut past = State::at_height(tree.as_ref(), 1).unwrap();
        assert_eq!(past.kind(), ViewKind::Historical);
        assert_eq!(past.accounts.get_balance(&addr(1), CoinId::BASE).unwrap(), 10);
        assert!(State::at_height(tree.as_ref(), 9).is_err());
    }

    #[test]
    fn identical_histories_have_identical_roots() {
        let run = || {
            let tree: Arc<dyn MutableTree> = Arc::new(MemTree::new());
            let mut state = State::new_deliver(tree).unwrap();
            state.accounts.add_balance(&addr(2), CoinId::BASE, 7).unwrap();
            state.accounts.add_balance(&addr(1), CoinId::BASE, 3).unwrap();
            state.commit().unwrap().0
        };
        assert_eq!(run(), run());
    }
}
