//! Market data shapes shared between the feed clients and the engine.

use serde::{Deserialize, Serialize};

/// An orderbook depth snapshot: `(price, quantity)` levels.
///
/// Bids are sorted by price descending (best bid first), asks ascending
/// (best ask first), matching the upstream depth endpoint ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Orderbook {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

impl Orderbook {
    /// Sum of all bid quantities.
    pub fn total_bid_qty(&self) -> f64 {
        self.bids.iter().map(|(_, q)| q).sum()
    }

    /// Sum of all ask quantities.
    pub fn total_ask_qty(&self) -> f64 {
        self.asks.iter().map(|(_, q)| q).sum()
    }

    /// Midpoint of best bid and best ask, if both sides have depth.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.bids.first().map(|(p, _)| *p)?;
        let ask = self.asks.first().map(|(p, _)| *p)?;
        Some((bid + ask) / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// One OHLCV record from a kline endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since epoch.
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
