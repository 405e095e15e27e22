//! Pricing formulas for the coin economy.
//!
//! Every function here is pure and integer-only so that all nodes compute
//! bit-identical results:
//! - `bancor`: constant-reserve-ratio bonding curve (sale/purchase and their inverses)
//! - `amm`: constant-product swap pool pricing with a fixed input fee
//!
//! Amounts are `u128` pip. Intermediates are widened to 256/512 bits.

pub mod amm;
pub mod bancor;
pub mod error;
mod fixed;

pub use amm::{calculate_buy_for_sell, calculate_sell_for_buy, check_swap};
pub use bancor::{buy_deposit, purchase_return, sale_amount, sale_return};
pub use error::{CurveError, SwapError};
pub use fixed::mul_div_floor;
