//! CoinGecko simple-price lookup, used as the fallback price source.

use crate::error::FeedError;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the CoinGecko public API (`/api/v3`).
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base: String,
}

impl CoinGeckoClient {
    pub fn new(base: impl Into<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    /// USD price for a coin id, `None` when the coin is not listed.
    pub async fn simple_price_usd(&self, coin_id: &str) -> Result<Option<f64>, FeedError> {
        let url = format!("{}/simple/price", self.base);
        debug!(url = %url, coin_id = coin_id, "fallback price request");

        let response = self
            .http
            .get(&url)
            .query(&[("ids", coin_id), ("vs_currencies", "usd")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let json: Value = response.json().await?;
        Ok(json[coin_id]["usd"].as_f64())
    }
}
