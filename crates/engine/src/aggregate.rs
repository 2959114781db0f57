//! Network-wide unbonding aggregation.
//!
//! A network scan enumerates every validator, then pages through each
//! validator's unbonding delegations with a bounded worker pool. One pass
//! produces all derived views at once (total, per-wallet tally, release
//! heatmap, distinct wallet count); callers pick the fields they need and
//! the 30-second cache keeps repeat commands from re-sweeping the chain.

use chrono::{DateTime, NaiveDateTime, Utc};
use futures_util::stream::{self, StreamExt};
use heli_core::{Amount, EntityTally};
use heli_feeds::types::{UnbondingDelegation, UnbondingEntry, Validator};
use heli_feeds::{collect_pages, FeedError, LcdApi};
use tracing::warn;

/// Bounded fan-out width for per-validator scans.
pub const FANOUT_WORKERS: usize = 10;

/// Heatmap window: days 0 through 14 inclusive.
pub const HEATMAP_DAYS: usize = 15;

/// Balance released per whole day-until-completion, days 0..=14.
///
/// Already-matured entries land in day 0; entries completing beyond the
/// window are dropped (display-range limit, not an error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayBuckets {
    buckets: [u64; HEATMAP_DAYS],
}

impl DayBuckets {
    pub fn add(&mut self, day: usize, amount: Amount) {
        if day < HEATMAP_DAYS {
            self.buckets[day] = self.buckets[day].saturating_add(amount.0);
        }
    }

    pub fn get(&self, day: usize) -> Amount {
        Amount(self.buckets.get(day).copied().unwrap_or(0))
    }

    pub fn merge(&mut self, other: &DayBuckets) {
        for (day, qty) in other.buckets.iter().enumerate() {
            self.buckets[day] = self.buckets[day].saturating_add(*qty);
        }
    }

    pub fn total(&self) -> Amount {
        Amount(self.buckets.iter().fold(0u64, |acc, q| acc.saturating_add(*q)))
    }

    /// Non-empty buckets as (day, amount), ascending by day.
    pub fn non_empty(&self) -> Vec<(usize, Amount)> {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, q)| **q > 0)
            .map(|(d, q)| (d, Amount(*q)))
            .collect()
    }
}

/// Result of one full network unbonding scan.
#[derive(Debug, Clone, Default)]
pub struct NetworkUnbonding {
    /// Sum of all unbonding balances across the network.
    pub total: Amount,
    /// Per-delegator unbonding balances, first-seen order preserved.
    pub wallets: EntityTally,
    /// Release heatmap over the next 14 days.
    pub heatmap: DayBuckets,
    /// Validators whose scan failed and contributed zero.
    pub failed_validators: usize,
}

impl NetworkUnbonding {
    /// Number of distinct wallets with at least one unbonding entry.
    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }
}

/// Partial result from one validator's scan.
#[derive(Debug, Clone, Default)]
struct ValidatorSlice {
    total: Amount,
    wallets: EntityTally,
    heatmap: DayBuckets,
}

/// Map an unbonding completion timestamp onto a heatmap day.
///
/// Timestamps without a zone designator are treated as UTC. Returns None
/// for unparseable timestamps and for completions beyond day 14.
pub fn day_bucket(completion_time: &str, now: DateTime<Utc>) -> Option<usize> {
    let completion = parse_completion_time(completion_time)?;
    let remaining = completion.signed_duration_since(now);
    if remaining.num_seconds() <= 0 {
        // Matured but not yet swept by the chain: releases "today".
        return Some(0);
    }
    let days = remaining.num_days();
    if days < HEATMAP_DAYS as i64 {
        Some(days as usize)
    } else {
        None
    }
}

fn parse_completion_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Zone-less timestamps are UTC by policy.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Fold one unbonding entry into a validator slice. Malformed balances
/// skip the entry; the rest of the page continues.
fn fold_entry(slice: &mut ValidatorSlice, delegator: &str, entry: &UnbondingEntry, now: DateTime<Utc>) {
    let Some(balance) = Amount::parse(&entry.balance) else {
        warn!(
            delegator = delegator,
            balance = %entry.balance,
            "skipping unbonding entry with malformed balance"
        );
        return;
    };

    slice.total += balance;
    slice.wallets.add(delegator, balance);
    if let Some(day) = day_bucket(&entry.completion_time, now) {
        slice.heatmap.add(day, balance);
    }
}

fn fold_delegation(slice: &mut ValidatorSlice, unbonding: &UnbondingDelegation, now: DateTime<Utc>) {
    if !unbonding.delegator_address.is_empty() {
        // Register the wallet even if every entry turns out malformed,
        // so the distinct-wallet count matches what the chain reports.
        slice.wallets.add(&unbonding.delegator_address, Amount::ZERO);
    }
    for entry in &unbonding.entries {
        fold_entry(slice, &unbonding.delegator_address, entry, now);
    }
}

async fn scan_validator<L: LcdApi>(
    lcd: &L,
    valoper: &str,
    now: DateTime<Utc>,
) -> Result<ValidatorSlice, FeedError> {
    let delegations = collect_pages(|key| async move {
        lcd.unbonding_page(valoper, key.as_deref()).await
    })
    .await?;

    let mut slice = ValidatorSlice::default();
    for unbonding in &delegations {
        fold_delegation(&mut slice, unbonding, now);
    }
    Ok(slice)
}

/// Scan every validator's unbonding queue and reduce into one result.
///
/// Validator enumeration failure aborts the whole scan (no meaningful
/// partial result exists). A single validator's failure is isolated: it
/// contributes zero, is counted in `failed_validators`, and never aborts
/// its siblings. All dispatched workers are joined before returning, so
/// the total is never silently partial.
pub async fn scan_network_unbonding<L: LcdApi>(
    lcd: &L,
    now: DateTime<Utc>,
) -> Result<NetworkUnbonding, FeedError> {
    let validators = lcd.validators(None).await?;

    let valopers: Vec<String> = validators
        .iter()
        .filter(|v: &&Validator| !v.operator_address.is_empty())
        .map(|v| v.operator_address.clone())
        .collect();
    let slices: Vec<(String, Result<ValidatorSlice, FeedError>)> = stream::iter(valopers)
        .map(|valoper| async move {
            let result = scan_validator(lcd, &valoper, now).await;
            (valoper, result)
        })
            .buffer_unordered(FANOUT_WORKERS)
            .collect()
            .await;

    // Reduce after join; the sum is commutative so completion order is
    // irrelevant, and no shared counter is mutated concurrently.
    let mut aggregate = NetworkUnbonding::default();
    for (valoper, result) in slices {
        match result {
            Ok(slice) => {
                aggregate.total += slice.total;
                aggregate.wallets.merge(slice.wallets);
                aggregate.heatmap.merge(&slice.heatmap);
            }
            Err(e) => {
                warn!(validator = %valoper, error = %e, "validator unbonding scan failed, counting as zero");
                aggregate.failed_validators += 1;
            }
        }
    }
    Ok(aggregate)
}

/// Balance, staked and unbonding totals for one wallet.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletSummary {
    pub balance: Amount,
    pub staked: Amount,
    pub unbonding: Amount,
}

/// Fetch the three per-wallet totals used by the treasury report.
pub async fn wallet_summary<L: LcdApi>(
    lcd: &L,
    address: &str,
    denom: &str,
) -> Result<WalletSummary, FeedError> {
    let balance = lcd.balance(address, denom).await?;

    let mut staked = Amount::ZERO;
    for delegation in lcd.delegations(address).await? {
        staked += delegation.balance.amount_or_zero();
    }

    let mut unbonding = Amount::ZERO;
    for response in lcd.delegator_unbonding(address).await? {
        for entry in &response.entries {
            match Amount::parse(&entry.balance) {
                Some(amount) => unbonding += amount,
                None => warn!(
                    address = address,
                    balance = %entry.balance,
                    "skipping malformed unbonding entry"
                ),
            }
        }
    }

    Ok(WalletSummary {
        balance,
        staked,
        unbonding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use heli_feeds::types::{DelegationResponse, StakingPool, Validator};
    use heli_feeds::Page;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(balance: &str, completion: DateTime<Utc>) -> UnbondingEntry {
        UnbondingEntry {
            balance: balance.to_string(),
            completion_time: completion.to_rfc3339(),
        }
    }

    fn validator(valoper: &str) -> Validator {
        Validator {
            operator_address: valoper.to_string(),
            ..Default::default()
        }
    }

    /// Mock LCD: per-validator unbonding pages, with selected validators
    /// failing every request.
    struct MockLcd {
        validators: Vec<Validator>,
        pages: HashMap<String, Vec<Page<UnbondingDelegation>>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl LcdApi for MockLcd {
        async fn validators(&self, _status: Option<&str>) -> Result<Vec<Validator>, FeedError> {
            Ok(self.validators.clone())
        }

        async fn unbonding_page(
            &self,
            valoper: &str,
            page_key: Option<&str>,
        ) -> Result<Page<UnbondingDelegation>, FeedError> {
            if self.failing.iter().any(|v| v == valoper) {
                return Err(FeedError::Timeout("mock timeout".into()));
            }
            let pages = self.pages.get(valoper).cloned().unwrap_or_default();
            let index = match page_key {
                None => 0,
                Some(key) => key.parse::<usize>().unwrap(),
            };
            Ok(pages
                .into_iter()
                .nth(index)
                .unwrap_or_else(|| Page::last(Vec::new())))
        }

        async fn staking_pool(&self) -> Result<StakingPool, FeedError> {
            Ok(StakingPool::default())
        }

        async fn total_supply(&self, _denom: &str) -> Result<Amount, FeedError> {
            Ok(Amount::ZERO)
        }

        async fn inflation(&self) -> Result<f64, FeedError> {
            Ok(0.0)
        }

        async fn balance(&self, _address: &str, _denom: &str) -> Result<Amount, FeedError> {
            Ok(Amount::ZERO)
        }

        async fn delegations(&self, _address: &str) -> Result<Vec<DelegationResponse>, FeedError> {
            Ok(Vec::new())
        }

        async fn delegator_unbonding(
            &self,
            _address: &str,
        ) -> Result<Vec<UnbondingDelegation>, FeedError> {
            Ok(Vec::new())
        }
    }

    fn unbonding(delegator: &str, entries: Vec<UnbondingEntry>) -> UnbondingDelegation {
        UnbondingDelegation {
            delegator_address: delegator.to_string(),
            entries,
        }
    }

    #[test]
    fn test_day_bucket_edges() {
        let now = now();
        // +3 days 2 hours -> day 3
        let d3 = now + Duration::days(3) + Duration::hours(2);
        assert_eq!(day_bucket(&d3.to_rfc3339(), now), Some(3));
        // Already matured (-1 second) -> day 0
        let matured = now - Duration::seconds(1);
        assert_eq!(day_bucket(&matured.to_rfc3339(), now), Some(0));
        // +20 days -> dropped
        let far = now + Duration::days(20);
        assert_eq!(day_bucket(&far.to_rfc3339(), now), None);
        // Day 14 is the last kept bucket
        let edge = now + Duration::days(14) + Duration::hours(1);
        assert_eq!(day_bucket(&edge.to_rfc3339(), now), Some(14));
        let past_edge = now + Duration::days(15);
        assert_eq!(day_bucket(&past_edge.to_rfc3339(), now), None);
    }

    #[test]
    fn test_day_bucket_naive_timestamp_is_utc() {
        let now = now();
        // Same instant as now + 2 days, but without a zone designator.
        assert_eq!(day_bucket("2026-09-01T14:00:00", now), Some(2));
        assert_eq!(day_bucket("2026-09-01T14:00:00.500", now), Some(2));
    }

    #[test]
    fn test_day_bucket_garbage() {
        assert_eq!(day_bucket("", now()), None);
        assert_eq!(day_bucket("soon", now()), None);
    }

    #[tokio::test]
    async fn test_scan_sums_across_pages() {
        let now = now();
        let release = now + Duration::days(1);
        let mut pages = HashMap::new();
        pages.insert(
            "val1".to_string(),
            vec![
                Page {
                    records: vec![unbonding("heli1a", vec![entry("100", release)])],
                    next_key: Some("1".into()),
                },
                Page::last(vec![unbonding("heli1b", vec![entry("250", release)])]),
            ],
        );

        let lcd = MockLcd {
            validators: vec![validator("val1")],
            pages,
            failing: Vec::new(),
        };

        let result = scan_network_unbonding(&lcd, now).await.unwrap();
        assert_eq!(result.total, Amount(350));
        assert_eq!(result.wallet_count(), 2);
        assert_eq!(result.heatmap.get(1), Amount(350));
        assert_eq!(result.failed_validators, 0);
    }

    #[tokio::test]
    async fn test_scan_isolates_failed_validator() {
        let now = now();
        let release = now + Duration::days(2);
        let mut pages = HashMap::new();
        let mut validators = Vec::new();
        for i in 0..10 {
            let valoper = format!("val{}", i);
            validators.push(validator(&valoper));
            pages.insert(
                valoper.clone(),
                vec![Page::last(vec![unbonding(
                    &format!("heli1w{}", i),
                    vec![entry("10", release)],
                )])],
            );
        }

        let lcd = MockLcd {
            validators,
            pages,
            failing: vec!["val7".to_string()],
        };

        let result = scan_network_unbonding(&lcd, now).await.unwrap();
        // 9 of 10 validators contribute; the failure is isolated.
        assert_eq!(result.total, Amount(90));
        assert_eq!(result.failed_validators, 1);
        assert_eq!(result.wallet_count(), 9);
    }

    #[tokio::test]
    async fn test_scan_skips_malformed_balance() {
        let now = now();
        let release = now + Duration::days(1);
        let mut pages = HashMap::new();
        pages.insert(
            "val1".to_string(),
            vec![Page::last(vec![unbonding(
                "heli1a",
                vec![
                    entry("100", release),
                    entry("garbage", release),
                    entry("50", release),
                ],
            )])],
        );

        let lcd = MockLcd {
            validators: vec![validator("val1")],
            pages,
            failing: Vec::new(),
        };

        let result = scan_network_unbonding(&lcd, now).await.unwrap();
        assert_eq!(result.total, Amount(150));
        assert_eq!(result.failed_validators, 0);
    }

    #[tokio::test]
    async fn test_scan_empty_validator_set() {
        let lcd = MockLcd {
            validators: Vec::new(),
            pages: HashMap::new(),
            failing: Vec::new(),
        };
        let result = scan_network_unbonding(&lcd, now()).await.unwrap();
        assert_eq!(result.total, Amount::ZERO);
        assert_eq!(result.wallet_count(), 0);
    }

    #[test]
    fn test_day_buckets_merge_and_total() {
        let mut a = DayBuckets::default();
        a.add(0, Amount(5));
        a.add(14, Amount(10));
        a.add(15, Amount(999)); // out of range, ignored

        let mut b = DayBuckets::default();
        b.add(0, Amount(3));

        a.merge(&b);
        assert_eq!(a.get(0), Amount(8));
        assert_eq!(a.get(14), Amount(10));
        assert_eq!(a.total(), Amount(18));
        assert_eq!(a.non_empty(), vec![(0, Amount(8)), (14, Amount(10))]);
    }
}
