//! MEXC public market-data client (ticker, depth, klines).
//!
//! Responses carry numerics as strings inside plain JSON arrays, so these
//! fetchers walk `serde_json::Value` and skip any level or candle that
//! fails to parse rather than failing the whole snapshot.

use crate::error::FeedError;
use heli_core::{Candle, Orderbook};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client against the MEXC spot REST API (`/api/v3`).
#[derive(Debug, Clone)]
pub struct MexcClient {
    http: reqwest::Client,
    base: String,
}

impl MexcClient {
    pub fn new(base: impl Into<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    async fn get_value(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FeedError> {
        let url = format!("{}{}", self.base, path);
        debug!(url = %url, "market request");

        let response = self.http.get(&url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }

    /// Last traded price. Returns 0.0 when the field is missing or
    /// malformed; the caller falls back to the secondary source on any
    /// non-positive price.
    pub async fn ticker_price(&self, symbol: &str) -> Result<f64, FeedError> {
        let json = self
            .get_value("/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        Ok(value_to_f64(&json["price"]).unwrap_or(0.0))
    }

    /// Orderbook depth snapshot with up to `limit` levels per side.
    pub async fn depth(&self, symbol: &str, limit: u32) -> Result<Orderbook, FeedError> {
        let json = self
            .get_value(
                "/depth",
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(Orderbook {
            bids: parse_levels(&json["bids"], symbol, "bid"),
            asks: parse_levels(&json["asks"], symbol, "ask"),
        })
    }

    /// Kline series, oldest first. Rows are
    /// `[open_time, open, high, low, close, volume, ...]`.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, FeedError> {
        let json = self
            .get_value(
                "/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let rows = match json.as_array() {
            Some(rows) => rows,
            None => return Err(FeedError::Parse("klines: expected array".into())),
        };

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            match parse_candle(row) {
                Some(candle) => candles.push(candle),
                None => warn!(symbol = symbol, "skipping malformed kline row"),
            }
        }
        Ok(candles)
    }
}

/// Accept both string-encoded and raw JSON numbers.
fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse `[["price", "qty"], ...]`, skipping malformed levels.
fn parse_levels(value: &Value, symbol: &str, side: &str) -> Vec<(f64, f64)> {
    let rows = match value.as_array() {
        Some(rows) => rows,
        None => return Vec::new(),
    };

    let mut levels = Vec::with_capacity(rows.len());
    for row in rows {
        let price = value_to_f64(&row[0]);
        let qty = value_to_f64(&row[1]);
        match (price, qty) {
            (Some(price), Some(qty)) => levels.push((price, qty)),
            _ => warn!(symbol = symbol, side = side, "skipping malformed depth level"),
        }
    }
    levels
}

fn parse_candle(row: &Value) -> Option<Candle> {
    Some(Candle {
        open_time_ms: row.get(0)?.as_i64()?,
        open: value_to_f64(row.get(1)?)?,
        high: value_to_f64(row.get(2)?)?,
        low: value_to_f64(row.get(3)?)?,
        close: value_to_f64(row.get(4)?)?,
        volume: value_to_f64(row.get(5)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_levels_skips_bad_rows() {
        let value = json!([
            ["0.0123", "1500.5"],
            ["oops", "10"],
            ["0.0124", "not-a-qty"],
            ["0.0125", "42"]
        ]);
        let levels = parse_levels(&value, "HELIUSDT", "bid");
        assert_eq!(levels, vec![(0.0123, 1500.5), (0.0125, 42.0)]);
    }

    #[test]
    fn test_parse_levels_missing_array() {
        assert!(parse_levels(&Value::Null, "HELIUSDT", "ask").is_empty());
    }

    #[test]
    fn test_parse_candle() {
        let row = json!([1700000000000i64, "0.010", "0.012", "0.009", "0.011", "123456.0", 0, "x"]);
        let candle = parse_candle(&row).unwrap();
        assert_eq!(candle.open_time_ms, 1_700_000_000_000);
        assert_eq!(candle.close, 0.011);
        assert_eq!(candle.volume, 123_456.0);
    }

    #[test]
    fn test_parse_candle_rejects_short_row() {
        assert!(parse_candle(&json!([1700000000000i64, "0.010"])).is_none());
    }

    #[test]
    fn test_value_to_f64_accepts_numbers_and_strings() {
        assert_eq!(value_to_f64(&json!("0.5")), Some(0.5));
        assert_eq!(value_to_f64(&json!(0.5)), Some(0.5));
        assert_eq!(value_to_f64(&json!(null)), None);
        assert_eq!(value_to_f64(&json!("")), None);
    }
}
