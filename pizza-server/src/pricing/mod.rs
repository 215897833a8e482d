//! Pizza pricing
//!
//! - [`calculator`]: per-pizza breakdown, line and cart pricing
//! - [`cart`]: cart validation run before pricing on the server paths

mod calculator;
mod cart;
pub(crate) mod money;

pub use calculator::*;
pub use cart::*;
pub use money::{MAX_CART_TOTAL, MAX_PRICE};
