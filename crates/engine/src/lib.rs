//! Aggregation and heuristics engine for the HELI monitor bot.
//!
//! This crate contains the network-wide unbonding scan, the derived
//! staking metrics, the orderbook/trend heuristics, and the TTL cache
//! that fronts the expensive scans.

pub mod aggregate;
pub mod cache;
pub mod metrics;
pub mod orderbook;
pub mod trend;

pub use aggregate::*;
pub use cache::*;
pub use metrics::*;
pub use orderbook::*;
pub use trend::*;
