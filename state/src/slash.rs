//! Slashing arithmetic shared by stakes and frozen funds.

use serde::{Deserialize, Serialize};
use strata_types::params::SLASH_PERCENT;
use strata_types::{Address, CoinId};

use crate::app::App;
use crate::coins::Coins;
use crate::StateError;

/// One slashed position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slash {
    pub owner: Address,
    pub coin: CoinId,
    /// Amount removed from circulation.
    pub slashed: u128,
    /// Amount left to the owner (frozen).
    pub kept: u128,
}

/// Split `value` into `(kept, slashed)` with `kept = floor(value · 95 / 100)`.
pub fn split(value: u128) -> (u128, u128) {
    let keep_percent = 100 - SLASH_PERCENT;
    let kept = value / 100 * keep_percent + value % 100 * keep_percent / 100;
    (kept, value - kept)
}

/// Remove `slashed` coins from circulation. Non-base coins are sold through
/// their curve and the returned base value is counted as slashed.
pub(crate) fn burn(
    coins: &mut Coins,
    app: &mut App,
    coin: CoinId,
    slashed: u128,
) -> Result<(), StateError> {
    if slashed == 0 {
        return Ok(());
    }
    if coin.is_base_coin() {
        return app.add_total_slashed(slashed);
    }
    let ret = coins.require(coin)?.sale_return(slashed)?;
    coins.sub_volume(coin, slashed)?;
    coins.sub_reserve(coin, ret)?;
    app.add_total_slashed(ret)
}
