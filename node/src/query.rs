//! Read-only queries against committed heights.

use strata_state::{State, StateError};
use strata_store::StoreError;
use strata_transactions::{estimate_coin_buy, estimate_coin_sell, BuyEstimate, SellEstimate, SwapFrom};
use strata_types::CoinId;

use crate::blockchain::Blockchain;
use crate::mempool::UnconfirmedTxs;
use crate::NodeError;

impl Blockchain {
    /// A read-only view of the state committed at `height`.
    pub fn state_for_height(&self, height: u64) -> Result<State, NodeError> {
        let version = height
            .checked_sub(self.base_height())
            .filter(|v| *v > 0 && height <= self.height())
            .ok_or(NodeError::HeightNotAvailable(height))?;
        State::at_height(self.tree(), version).map_err(|e| match e {
            StateError::Store(StoreError::VersionNotFound(_)) => NodeError::HeightNotAvailable(height),
            other => other.into(),
        })
    }

    fn view(&self, height: Option<u64>) -> Result<State, NodeError> {
        self.state_for_height(height.unwrap_or_else(|| self.height()))
    }

    /// Block gas limit in force at `height`.
    pub fn max_gas(&self, height: u64) -> Result<u64, NodeError> {
        Ok(self.state_for_height(height)?.app.max_gas()?)
    }

    /// Estimate a sale at `height`, or at the last committed height.
    pub fn estimate_coin_sell(
        &self,
        height: Option<u64>,
        coin_to_sell: CoinId,
        coin_to_buy: CoinId,
        value_to_sell: u128,
        swap_from: SwapFrom,
    ) -> Result<SellEstimate, NodeError> {
        let mut state = self.view(height)?;
        Ok(estimate_coin_sell(
            &mut state,
            coin_to_sell,
            coin_to_buy,
            value_to_sell,
            swap_from,
        )?)
    }

    /// Estimate a purchase at `height`, or at the last committed height.
    pub fn estimate_coin_buy(
        &self,
        height: Option<u64>,
        coin_to_sell: CoinId,
        coin_to_buy: CoinId,
        value_to_buy: u128,
        swap_from: SwapFrom,
    ) -> Result<BuyEstimate, NodeError> {
        let mut state = self.view(height)?;
        Ok(estimate_coin_buy(
            &mut state,
            coin_to_sell,
            coin_to_buy,
            value_to_buy,
            swap_from,
        )?)
    }

    pub fn unconfirmed_txs(&self, limit: usize) -> UnconfirmedTxs {
        self.mempool().unconfirmed(limit)
    }
}
