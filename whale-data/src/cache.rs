//! Keyed query cache with a staleness policy.
//!
//! Shared between dataset sessions. The entry map is behind a [`parking_lot::Mutex`]
//! that is only held for bookkeeping, never across a loader `.await`.
//!
//! Each miss stamps the entry with a new generation. A loader only writes its result back
//! if no later miss on the same key started while it was running.

use crate::error::DataError;
use fnv::FnvHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::debug;
use whale_analytics::Record;

/// Cache of loaded record arrays, keyed by [`Dataset::cache_key`](whale_analytics::Dataset::cache_key).
pub type RecordCache = QueryCache<Vec<Record>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CacheState {
    Loading,
    Success,
    Error,
}

#[derive(Debug)]
struct CacheEntry<T> {
    data: Option<Arc<T>>,
    /// `None` once invalidated
    fetched_at: Option<Instant>,
    state: CacheState,
    error: Option<DataError>,
    /// Bumped by every miss
    generation: u64,
}

impl<T> CacheEntry<T> {
    fn loading() -> Self {
        Self {
            data: None,
            fetched_at: None,
            state: CacheState::Loading,
            error: None,
            generation: 0,
        }
    }

    fn fresh_data(&self, stale_after: Duration) -> Option<Arc<T>> {
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() < stale_after {
            self.data.clone()
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct QueryCache<T> {
    entries: Mutex<FnvHashMap<String, CacheEntry<T>>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(FnvHashMap::default()),
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if it is younger than `stale_after`, otherwise
    /// run `loader` and cache its result.
    ///
    /// A failed load keeps any previously cached data (served by [`Self::peek`]) and
    /// records the error on the entry. If a newer fetch of `key` started while `loader`
    /// ran, the caller still receives its own result but the entry is left untouched.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        loader: F,
        stale_after: Duration,
    ) -> Result<Arc<T>, DataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DataError>>,
    {
        let generation = {
            let mut entries = self.entries.lock();
            let entry = entries
                .entry(key.to_string())
                .or_insert_with(CacheEntry::loading);

            if let Some(data) = entry.fresh_data(stale_after) {
                debug!(key, "Query cache hit");
                return Ok(data);
            }

            entry.generation += 1;
            entry.state = CacheState::Loading;
            debug!(key, generation = entry.generation, "Query cache miss");
            entry.generation
        };

        let result = loader().await;

        let mut entries = self.entries.lock();
        let Some(entry) = entries
            .get_mut(key)
            .filter(|entry| entry.generation == generation)
        else {
            debug!(key, generation, "Discarding superseded cache load");
            return result.map(Arc::new);
        };

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                entry.data = Some(Arc::clone(&data));
                entry.fetched_at = Some(Instant::now());
                entry.state = CacheState::Success;
                entry.error = None;
                Ok(data)
            }
            Err(error) => {
                entry.state = CacheState::Error;
                entry.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Mark `key` stale so the next [`Self::get_or_fetch`] reloads it.
    ///
    /// Returns `false` if nothing was cached under `key`.
    pub fn invalidate(&self, key: &str) -> bool {
        match self.entries.lock().get_mut(key) {
            Some(entry) => {
                debug!(key, "Query cache invalidated");
                entry.fetched_at = None;
                true
            }
            None => false,
        }
    }

    /// Last successfully loaded value for `key`, regardless of staleness.
    pub fn peek(&self, key: &str) -> Option<Arc<T>> {
        self.entries.lock().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn state(&self, key: &str) -> Option<CacheState> {
        self.entries.lock().get(key).map(|entry| entry.state)
    }

    /// Error of the most recent failed load of `key`, cleared by the next success.
    pub fn last_error(&self, key: &str) -> Option<DataError> {
        self.entries.lock().get(key).and_then(|entry| entry.error.clone())
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FOREVER: Duration = Duration::from_secs(3600);

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32, DataError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_get_or_fetch_serves_fresh_entry() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_fetch("markets", || counted(&calls, 1), FOREVER).await;
        let second = cache.get_or_fetch("markets", || counted(&calls, 2), FOREVER).await;

        assert_eq!(*first.unwrap(), 1);
        assert_eq!(*second.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state("markets"), Some(CacheState::Success));
    }

    #[tokio::test]
    async fn test_get_or_fetch_reloads_stale_entry() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch("whales", || counted(&calls, 1), Duration::ZERO).await.unwrap();
        let second = cache.get_or_fetch("whales", || counted(&calls, 2), Duration::ZERO).await;

        assert_eq!(*second.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        assert!(!cache.invalidate("markets"));

        cache.get_or_fetch("markets", || counted(&calls, 1), FOREVER).await.unwrap();
        assert!(cache.invalidate("markets"));
        assert_eq!(cache.peek("markets").as_deref(), Some(&1));

        let reloaded = cache.get_or_fetch("markets", || counted(&calls, 2), FOREVER).await;
        assert_eq!(*reloaded.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_data() {
        let cache = QueryCache::new();

        cache
            .get_or_fetch("trades-infinite", || async { Ok(vec![1, 2, 3]) }, Duration::ZERO)
            .await
            .unwrap();

        let error = DataError::Transport("connection refused".to_string());
        let failed = cache
            .get_or_fetch(
                "trades-infinite",
                || async { Err(DataError::Transport("connection refused".to_string())) },
                Duration::ZERO,
            )
            .await;

        assert_eq!(failed, Err(error.clone()));
        assert_eq!(cache.state("trades-infinite"), Some(CacheState::Error));
        assert_eq!(cache.last_error("trades-infinite"), Some(error));
        assert_eq!(cache.peek("trades-infinite").as_deref(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_slow_older_load_does_not_overwrite_newer() {
        let cache = QueryCache::new();

        let older = cache.get_or_fetch(
            "markets",
            || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok("old")
            },
            Duration::ZERO,
        );
        let newer = cache.get_or_fetch("markets", || async { Ok("new") }, Duration::ZERO);

        let (older, newer) = tokio::join!(older, newer);

        assert_eq!(older.as_deref(), Ok(&"old"));
        assert_eq!(newer.as_deref(), Ok(&"new"));
        assert_eq!(cache.peek("markets").as_deref(), Some(&"new"));
        assert_eq!(cache.state("markets"), Some(CacheState::Success));
    }

    #[tokio::test]
    async fn test_slow_older_failure_does_not_mark_entry_failed() {
        let cache = QueryCache::new();

        let older = cache.get_or_fetch(
            "whales",
            || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(DataError::Transport("timeout".to_string()))
            },
            Duration::ZERO,
        );
        let newer = cache.get_or_fetch("whales", || async { Ok(7) }, Duration::ZERO);

        let (older, newer) = tokio::join!(older, newer);

        assert!(older.is_err());
        assert_eq!(newer.as_deref(), Ok(&7));
        assert_eq!(cache.state("whales"), Some(CacheState::Success));
        assert_eq!(cache.last_error("whales"), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = QueryCache::new();

        cache.get_or_fetch("markets", || async { Ok("m") }, FOREVER).await.unwrap();
        cache.get_or_fetch("whales", || async { Ok("w") }, FOREVER).await.unwrap();
        cache.invalidate("markets");

        assert_eq!(cache.peek("whales").as_deref(), Some(&"w"));
        assert_eq!(cache.state("missing"), None);

        cache.clear();
        assert_eq!(cache.peek("whales"), None);
    }
}
