//! Generic cursor-following pagination driver.
//!
//! Cosmos LCD list endpoints return a page of records plus an opaque
//! `pagination.next_key`; the final page carries no key. Every paginated
//! fetch in this crate goes through [`collect_pages`] so the loop exists
//! exactly once.

use crate::error::FeedError;
use std::future::Future;

/// One page of records plus the continuation cursor, if any.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub next_key: Option<String>,
}

impl<T> Page<T> {
    pub fn last(records: Vec<T>) -> Self {
        Self {
            records,
            next_key: None,
        }
    }
}

/// Fetch pages until the continuation cursor is exhausted, collecting all
/// records. The first call passes no cursor. An empty-string cursor is
/// treated the same as an absent one; some gateways emit `""` instead of
/// null on the last page.
///
/// Termination depends on the upstream eventually omitting the cursor; the
/// per-request timeout on the HTTP client bounds each individual call.
pub async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, FeedError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, FeedError>>,
{
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch_page(cursor.take()).await?;
        records.extend(page.records);

        match page.next_key {
            Some(key) if !key.is_empty() => cursor = Some(key),
            _ => return Ok(records),
        }
    }
}
