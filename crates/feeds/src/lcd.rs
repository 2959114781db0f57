//! Cosmos LCD (REST gateway) client.
//!
//! All staking/bank/mint lookups go through [`LcdClient`]. The aggregation
//! engine consumes the [`LcdApi`] trait instead of the concrete client so
//! it can be driven by a mock adapter in tests.

use crate::error::FeedError;
use crate::paginate::{collect_pages, Page};
use crate::types::*;
use async_trait::async_trait;
use heli_core::Amount;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Per-page record limit for paginated endpoints.
pub const PAGE_LIMIT: u32 = 200;

/// Per-request timeout. A timed-out call fails that call only; callers
/// decide whether the command degrades or aborts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The subset of LCD operations the engine and command handlers consume.
#[async_trait]
pub trait LcdApi: Send + Sync {
    /// All validators, optionally filtered by bond status.
    async fn validators(&self, status: Option<&str>) -> Result<Vec<Validator>, FeedError>;

    /// One page of unbonding delegations against a validator.
    async fn unbonding_page(
        &self,
        valoper: &str,
        page_key: Option<&str>,
    ) -> Result<Page<UnbondingDelegation>, FeedError>;

    /// Staking pool totals (bonded / not bonded).
    async fn staking_pool(&self) -> Result<StakingPool, FeedError>;

    /// Total supply of one denom; zero when the denom is absent.
    async fn total_supply(&self, denom: &str) -> Result<Amount, FeedError>;

    /// Current inflation rate as a fraction.
    async fn inflation(&self) -> Result<f64, FeedError>;

    /// Spendable balance of one denom for a wallet; zero when absent.
    async fn balance(&self, address: &str, denom: &str) -> Result<Amount, FeedError>;

    /// All delegations of a wallet.
    async fn delegations(&self, address: &str) -> Result<Vec<DelegationResponse>, FeedError>;

    /// All unbonding delegations of a wallet (across validators).
    async fn delegator_unbonding(
        &self,
        address: &str,
    ) -> Result<Vec<UnbondingDelegation>, FeedError>;
}

/// HTTP client against one LCD base URL.
#[derive(Debug, Clone)]
pub struct LcdClient {
    http: reqwest::Client,
    base: String,
}

impl LcdClient {
    /// Create a client for the given base URL (no trailing slash).
    pub fn new(base: impl Into<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FeedError> {
        let url = format!("{}{}", self.base, path);
        debug!(url = %url, "LCD request");

        let response = self.http.get(&url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    /// Look up a single validator by operator address. `Ok(None)` when the
    /// LCD reports it unknown.
    pub async fn validator(&self, valoper: &str) -> Result<Option<Validator>, FeedError> {
        let path = format!("/cosmos/staking/v1beta1/validators/{}", valoper);
        match self.get::<ValidatorResponse>(&path, &[]).await {
            Ok(resp) => Ok(resp.validator),
            Err(FeedError::Status(404)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Latest block height and proposer.
    pub async fn latest_block(&self) -> Result<BlockStatus, FeedError> {
        let resp: BlockResponse = self
            .get("/cosmos/base/tendermint/v1beta1/blocks/latest", &[])
            .await?;
        Ok(BlockStatus {
            height: resp.block.header.height,
            proposer_address: resp.block.header.proposer_address,
        })
    }
}

fn page_query(page_key: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("pagination.limit", PAGE_LIMIT.to_string())];
    if let Some(key) = page_key {
        query.push(("pagination.key", key.to_string()));
    }
    query
}

#[async_trait]
impl LcdApi for LcdClient {
    async fn validators(&self, status: Option<&str>) -> Result<Vec<Validator>, FeedError> {
        collect_pages(|key| async move {
            let mut query = page_query(key.as_deref());
            if let Some(status) = status {
                query.push(("status", status.to_string()));
            }
            let resp: ValidatorsResponse = self
                .get("/cosmos/staking/v1beta1/validators", &query)
                .await?;
            Ok(Page {
                records: resp.validators,
                next_key: resp.pagination.next_key,
            })
        })
        .await
    }

    async fn unbonding_page(
        &self,
        valoper: &str,
        page_key: Option<&str>,
    ) -> Result<Page<UnbondingDelegation>, FeedError> {
        let path = format!(
            "/cosmos/staking/v1beta1/validators/{}/unbonding_delegations",
            valoper
        );
        let resp: UnbondingDelegationsResponse =
            self.get(&path, &page_query(page_key)).await?;
        Ok(Page {
            records: resp.unbonding_responses,
            next_key: resp.pagination.next_key,
        })
    }

    async fn staking_pool(&self) -> Result<StakingPool, FeedError> {
        let resp: PoolResponse = self.get("/cosmos/staking/v1beta1/pool", &[]).await?;
        Ok(resp.pool)
    }

    async fn total_supply(&self, denom: &str) -> Result<Amount, FeedError> {
        let coins = collect_pages(|key| async move {
            let resp: SupplyResponse = self
                .get("/cosmos/bank/v1beta1/supply", &page_query(key.as_deref()))
                .await?;
            Ok(Page {
                records: resp.supply,
                next_key: resp.pagination.next_key,
            })
        })
        .await?;

        Ok(coins
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount_or_zero())
            .unwrap_or(Amount::ZERO))
    }

    async fn inflation(&self) -> Result<f64, FeedError> {
        let resp: InflationResponse = self.get("/cosmos/mint/v1beta1/inflation", &[]).await?;
        Ok(resp.inflation.trim().parse::<f64>().unwrap_or(0.0))
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Amount, FeedError> {
        let path = format!("/cosmos/bank/v1beta1/balances/{}", address);
        let resp: BalancesResponse = self.get(&path, &[]).await?;
        Ok(resp
            .balances
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount_or_zero())
            .unwrap_or(Amount::ZERO))
    }

    async fn delegations(&self, address: &str) -> Result<Vec<DelegationResponse>, FeedError> {
        let path = format!("/cosmos/staking/v1beta1/delegations/{}", address);
        let path = &path;
        collect_pages(|key| async move {
            let resp: DelegationsResponse = self.get(path, &page_query(key.as_deref())).await?;
            Ok(Page {
                records: resp.delegation_responses,
                next_key: resp.pagination.next_key,
            })
        })
        .await
    }

    async fn delegator_unbonding(
        &self,
        address: &str,
    ) -> Result<Vec<UnbondingDelegation>, FeedError> {
        let path = format!(
            "/cosmos/staking/v1beta1/delegators/{}/unbonding_delegations",
            address
        );
        let path = &path;
        collect_pages(|key| async move {
            let resp: UnbondingDelegationsResponse =
                self.get(path, &page_query(key.as_deref())).await?;
            Ok(Page {
                records: resp.unbonding_responses,
                next_key: resp.pagination.next_key,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_query_first_call_omits_key() {
        let query = page_query(None);
        assert_eq!(query, vec![("pagination.limit", "200".to_string())]);
    }

    #[test]
    fn test_page_query_carries_cursor() {
        let query = page_query(Some("b64key=="));
        assert_eq!(
            query,
            vec![
                ("pagination.limit", "200".to_string()),
                ("pagination.key", "b64key==".to_string()),
            ]
        );
    }
}
