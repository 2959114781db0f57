//! Remote data source adapters for the HELI monitor bot.
//!
//! This crate provides:
//! - A typed Cosmos LCD client behind the [`LcdApi`] trait
//! - MEXC market-data fetchers (ticker, depth, klines)
//! - A CoinGecko fallback price lookup
//! - The shared cursor-following pagination driver

pub mod coingecko;
pub mod error;
pub mod lcd;
pub mod mexc;
pub mod paginate;
pub mod types;

pub use coingecko::CoinGeckoClient;
pub use error::FeedError;
pub use lcd::{LcdApi, LcdClient, PAGE_LIMIT};
pub use mexc::MexcClient;
pub use paginate::{collect_pages, Page};
