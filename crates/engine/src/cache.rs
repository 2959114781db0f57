//! A small TTL cache with a single get-or-compute entry point.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory cache where entries expire `ttl` after being stored.
///
/// `get_or_try_compute` holds the cache lock across the compute future,
/// so concurrent callers for any key serialize and the second caller
/// observes the first one's fresh value instead of recomputing. That is
/// the intended behavior for the expensive network-wide scans this
/// cache fronts; do not use it for cheap high-fanout lookups.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh cached value, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    /// Return the fresh cached value or run `compute` and cache its
    /// result. A compute error is returned as-is and nothing is cached,
    /// so the next caller retries.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some((stored_at, value)) = entries.get(&key) {
            if stored_at.elapsed() < self.ttl {
                debug!("cache hit");
                return Ok(value.clone());
            }
        }

        let value = compute().await?;
        entries.insert(key, (Instant::now(), value.clone()));
        Ok(value)
    }

    /// Drop one entry so the next lookup recomputes.
    pub async fn invalidate(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(counter: &AtomicUsize, value: u32) -> Result<u32, &'static str> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_try_compute("k", || counted(&calls, 7)).await;
        let second = cache.get_or_try_compute("k", || counted(&calls, 8)).await;

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_recomputes() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_try_compute("k", || counted(&calls, 1)).await;
        let second = cache.get_or_try_compute("k", || counted(&calls, 2)).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_is_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let failed: Result<u32, &str> = cache
            .get_or_try_compute("k", || async { Err("boom") })
            .await;
        assert_eq!(failed, Err("boom"));

        let ok = cache.get_or_try_compute("k", || counted(&calls, 5)).await;
        assert_eq!(ok, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let _ = cache.get_or_try_compute("k", || counted(&calls, 1)).await;
        cache.invalidate(&"k").await;
        let _ = cache.get_or_try_compute("k", || counted(&calls, 2)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(&"k").await, Some(2));
    }
}
