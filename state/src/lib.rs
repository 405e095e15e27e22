//! Versioned economic state of the Strata chain.
//!
//! A `State` is one view over the versioned tree: the deliver view applies
//! a block and commits it, the check view admits mempool transactions, and
//! historical views answer queries at past heights. Each view owns its
//! sub-states, which load lazily from the tree snapshot and cache until the
//! view is dropped:
//! - `app`: height, slashed total, gas limit, coin counter
//! - `accounts`: nonces and balances
//! - `coins`: coin registry with bonding-curve pricing
//! - `candidates`: validator candidates and ordered stake lists
//! - `frozen_funds`: time-locked funds
//! - `checks`: redeemed check registry
//! - `swap`: constant-product pools

pub mod accounts;
pub mod app;
pub mod bus;
pub mod candidates;
pub mod checks;
mod codec;
pub mod coins;
pub mod error;
pub mod export;
pub mod frozen_funds;
pub mod slash;
pub mod state;
pub mod swap;

pub use accounts::{Account, Accounts};
pub use app::{App, AppModel};
pub use bus::Bus;
pub use candidates::{Candidate, CandidateStatus, Candidates, Stake};
pub use checks::Checks;
pub use coins::{Coin, Coins};
pub use error::StateError;
pub use export::{GenesisAccount, GenesisBalance, GenesisCandidate, GenesisFrozenFund, GenesisState};
pub use frozen_funds::{FrozenFund, FrozenFunds};
pub use slash::Slash;
pub use state::{State, ViewKind};
pub use swap::{Pool, Swap};
