//! Chain-wide counters: height, slashed total, block gas limit, coin counter.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_store::{keys, ImmutableTree, WriteBatch};
use strata_types::params::DEFAULT_MAX_GAS;
use strata_types::CoinId;

use crate::codec;
use crate::StateError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModel {
    pub height: u64,
    /// Base-coin value removed from circulation by slashing.
    pub total_slashed: u128,
    pub max_gas: u64,
    /// Highest coin id handed out so far.
    pub coins_count: u32,
}

impl Default for AppModel {
    fn default() -> Self {
        Self {
            height: 0,
            total_slashed: 0,
            max_gas: DEFAULT_MAX_GAS,
            coins_count: 0,
        }
    }
}

pub struct App {
    base: Arc<dyn ImmutableTree>,
    model: Option<AppModel>,
    dirty: bool,
}

impl App {
    pub(crate) fn new(base: Arc<dyn ImmutableTree>) -> Self {
        Self {
            base,
            model: None,
            dirty: false,
        }
    }

    fn model(&mut self) -> Result<&mut AppModel, StateError> {
        let model = match self.model.take() {
            Some(model) => model,
            None => codec::load(self.base.as_ref(), &keys::app())?.unwrap_or_default(),
        };
        Ok(self.model.insert(model))
    }

    fn model_mut(&mut self) -> Result<&mut AppModel, StateError> {
        self.dirty = true;
        self.model()
    }

    pub fn height(&mut self) -> Result<u64, StateError> {
        Ok(self.model()?.height)
    }

    pub fn set_height(&mut self, height: u64) -> Result<(), StateError> {
        self.model_mut()?.height = height;
        Ok(())
    }

    pub fn total_slashed(&mut self) -> Result<u128, StateError> {
        Ok(self.model()?.total_slashed)
    }

    pub fn add_total_slashed(&mut self, amount: u128) -> Result<(), StateError> {
        let model = self.model_mut()?;
        model.total_slashed = model
            .total_slashed
            .checked_add(amount)
            .ok_or(StateError::Arithmetic("total slashed"))?;
        Ok(())
    }

    pub fn max_gas(&mut self) -> Result<u64, StateError> {
        Ok(self.model()?.max_gas)
    }

    pub fn set_max_gas(&mut self, max_gas: u64) -> Result<(), StateError> {
        self.model_mut()?.max_gas = max_gas;
        Ok(())
    }

    pub fn coins_count(&mut self) -> Result<u32, StateError> {
        Ok(self.model()?.coins_count)
    }

    /// Reserve the next coin id.
    pub fn next_coin_id(&mut self) -> Result<CoinId, StateError> {
        let model = self.model_mut()?;
        model.coins_count = model
            .coins_count
            .checked_add(1)
            .ok_or(StateError::Arithmetic("coin counter"))?;
        Ok(CoinId::new(model.coins_count))
    }

    pub fn export(&mut self) -> Result<AppModel, StateError> {
        Ok(self.model()?.clone())
    }

    pub(crate) fn import(&mut self, model: AppModel) {
        self.model = Some(model);
        self.dirty = true;
    }

    pub(crate) fn flush(&self, batch: &mut WriteBatch) -> Result<(), StateError> {
        if let (true, Some(model)) = (self.dirty, &self.model) {
            batch.put(keys::app(), codec::encode(model)?);
        }
        Ok(())
    }

    pub(crate) fn rebase(&mut self, base: Arc<dyn ImmutableTree>) {
        self.base = base;
        self.dirty = false;
    }
}
