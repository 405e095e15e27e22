//! Cross-sub-state access for operations that span several sub-states.

use crate::accounts::Accounts;
use crate::app::App;
use crate::coins::Coins;
use crate::frozen_funds::FrozenFunds;

/// Mutable borrows of the sub-states the candidate ledger reaches into.
///
/// Built by `State::candidates_and_bus`, which splits the container's
/// fields so the candidates can be borrowed at the same time.
pub struct Bus<'a> {
    pub app: &'a mut App,
    pub accounts: &'a mut Accounts,
    pub coins: &'a mut Coins,
    pub frozen_funds: &'a mut FrozenFunds,
}
