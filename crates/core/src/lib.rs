//! Core data types for the HELI chain monitor bot.

pub mod amount;
pub mod market;
pub mod tally;

pub use amount::{format_amount, Amount, MICRO_PER_HELI};
pub use market::{Candle, Orderbook};
pub use tally::EntityTally;
