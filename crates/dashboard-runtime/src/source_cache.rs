//! TTL cache of downloaded source bytes.
//!
//! Wraps a [`SourceFetcher`] with a per-source time-to-live.  Callers use
//! [`SourceCache::get`] to obtain fresh-or-cached bytes; a valid entry is
//! served without touching the fetcher.  A failed fetch is returned to the
//! caller as-is: there is no retry and no fallback to a stale entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashboard_core::error::{DashboardError, Result};
use tracing::{debug, warn};

use crate::fetcher::SourceFetcher;
use crate::source::SourceLocation;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

struct CacheEntry {
    bytes: Vec<u8>,
    fetched_at: Instant,
}

/// Per-source TTL cache in front of a fetcher.
///
/// # Example
/// ```no_run
/// use dashboard_runtime::fetcher::HttpFetcher;
/// use dashboard_runtime::source::SourceLocation;
/// use dashboard_runtime::source_cache::SourceCache;
///
/// # async fn demo() -> dashboard_core::Result<()> {
/// let mut cache = SourceCache::new(HttpFetcher::new()?, 600);
/// let location = SourceLocation::parse("data/faturamento.xlsx");
/// let bytes = cache.get(&location, false).await?;
/// println!("{} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
pub struct SourceCache<F> {
    fetcher: F,
    /// Maximum age of an entry before it is considered stale.
    cache_ttl: Duration,
    entries: HashMap<String, CacheEntry>,
    /// Description of the last fetch error, cleared on the next success.
    last_error: Option<String>,
}

impl<F: SourceFetcher> SourceCache<F> {
    pub fn new(fetcher: F, cache_ttl_secs: u64) -> Self {
        Self {
            fetcher,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            entries: HashMap::new(),
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the bytes for `location`, fetching when the entry is absent,
    /// stale, or `force_refresh` is set.
    pub async fn get(&mut self, location: &SourceLocation, force_refresh: bool) -> Result<&[u8]> {
        let key = location.id();

        if force_refresh || !self.is_cache_valid(&key) {
            match self.fetcher.fetch(location).await {
                Ok(bytes) => {
                    debug!(source = %key, bytes = bytes.len(), "source cache updated");
                    self.entries.insert(
                        key.clone(),
                        CacheEntry {
                            bytes,
                            fetched_at: Instant::now(),
                        },
                    );
                    self.last_error = None;
                }
                Err(e) => {
                    warn!(source = %key, error = %e, "fetch failed");
                    self.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        } else {
            debug!(source = %key, "returning cached source");
        }

        self.entries
            .get(&key)
            .map(|entry| entry.bytes.as_slice())
            .ok_or_else(|| DashboardError::NoData(key.clone()))
    }

    /// Drop the entry for `key`, forcing the next [`get`](Self::get) to fetch.
    pub fn invalidate(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!(source = %key, "cache entry invalidated");
        }
    }

    /// Drop every entry.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        debug!("source cache cleared");
    }

    /// Age of the entry for `key`, or `None` if it was never fetched.
    pub fn cache_age(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).map(|e| e.fetched_at.elapsed())
    }

    /// `true` when `key` holds bytes still within the TTL.
    pub fn is_cache_valid(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.fetched_at.elapsed() < self.cache_ttl)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Returns the call number as the payload; fails while `fail` is set.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl SourceFetcher for CountingFetcher {
        async fn fetch(&self, location: &SourceLocation) -> Result<Vec<u8>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(DashboardError::Fetch {
                    source_id: location.id(),
                    message: "boom".to_string(),
                });
            }
            Ok(vec![n as u8])
        }
    }

    fn loc(name: &str) -> SourceLocation {
        SourceLocation::parse(name)
    }

    fn calls(cache: &SourceCache<CountingFetcher>) -> usize {
        cache.fetcher.calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_cache_miss_on_first_call() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 30);
        assert!(!cache.is_cache_valid("a.csv"));
        assert!(cache.cache_age("a.csv").is_none());

        let bytes = cache.get(&loc("a.csv"), false).await.unwrap().to_vec();
        assert_eq!(bytes, vec![1]);
        assert_eq!(calls(&cache), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 30);
        cache.get(&loc("a.csv"), false).await.unwrap();
        let second = cache.get(&loc("a.csv"), false).await.unwrap().to_vec();

        assert_eq!(second, vec![1]);
        assert_eq!(calls(&cache), 1);
        let age = cache.cache_age("a.csv").unwrap();
        assert!(age < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 0);
        cache.get(&loc("a.csv"), false).await.unwrap();
        assert!(!cache.is_cache_valid("a.csv"));
        let second = cache.get(&loc("a.csv"), false).await.unwrap().to_vec();
        assert_eq!(second, vec![2]);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_valid_entry() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 600);
        cache.get(&loc("a.csv"), false).await.unwrap();
        let refreshed = cache.get(&loc("a.csv"), true).await.unwrap().to_vec();
        assert_eq!(refreshed, vec![2]);
        assert_eq!(calls(&cache), 2);
    }

    #[tokio::test]
    async fn test_entries_are_keyed_per_source() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 600);
        cache.get(&loc("a.csv"), false).await.unwrap();
        cache.get(&loc("b.csv"), false).await.unwrap();
        cache.get(&loc("a.csv"), false).await.unwrap();
        assert_eq!(calls(&cache), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_single_and_all() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 600);
        cache.get(&loc("a.csv"), false).await.unwrap();
        cache.get(&loc("b.csv"), false).await.unwrap();

        cache.invalidate("a.csv");
        assert!(!cache.is_cache_valid("a.csv"));
        assert!(cache.is_cache_valid("b.csv"));

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.cache_age("b.csv").is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_surfaced_without_stale_fallback() {
        let mut cache = SourceCache::new(CountingFetcher::default(), 0);
        cache.get(&loc("a.csv"), false).await.unwrap();

        cache.fetcher.fail.store(true, Ordering::SeqCst);
        let err = cache.get(&loc("a.csv"), false).await.unwrap_err();
        assert!(matches!(err, DashboardError::Fetch { .. }));
        assert_eq!(calls(&cache), 2);
        assert!(cache.last_error().is_some_and(|e| e.contains("boom")));

        cache.fetcher.fail.store(false, Ordering::SeqCst);
        cache.get(&loc("a.csv"), false).await.unwrap();
        assert!(cache.last_error().is_none());
    }
}
