//! Filter-keyed query cache over data-store reads
//!
//! Avoids redundant network calls for identical (resource, filter)
//! pairs within a freshness window. Values are stored as JSON strings
//! so one cache serves every resource shape.
//!
//! Guarantees:
//! - A fresh key is served from memory with no network call.
//! - A stale key is served immediately while a single background
//!   refresh runs (stale-while-revalidate).
//! - Concurrent reads for a missing key share one in-flight fetch.
//! - A successful mutation invalidates every key of that resource.
//! - Prefetch is debounced and guarded per key.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Freshness window for record-list keys
pub const LIST_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Freshness window for month-list keys; months change far less often
pub const MONTHS_FRESHNESS: Duration = Duration::from_secs(10 * 60);

/// Delay before a prefetch fires, so rapid hover movement does not
/// trigger a burst of fetches
pub const PREFETCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Upper bound on cached entries
const MAX_ENTRIES: u64 = 10_000;

/// Entries older than this are evicted outright, stale serving included
const HARD_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache key: a (resource, filter) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ExpenseList {
        building_id: String,
        month: Option<String>,
    },
    ExpenseMonths {
        building_id: String,
    },
    ProjectList,
    ProjectDetail {
        id: String,
    },
    ProviderList,
    BuildingList,
}

impl QueryKey {
    /// Resource kind, used for mutation-driven invalidation.
    pub fn resource(&self) -> &'static str {
        match self {
            Self::ExpenseList { .. } | Self::ExpenseMonths { .. } => "expenses",
            Self::ProjectList | Self::ProjectDetail { .. } => "projects",
            Self::ProviderList => "providers",
            Self::BuildingList => "buildings",
        }
    }

    /// How long a cached value counts as fresh.
    pub fn freshness(&self) -> Duration {
        match self {
            Self::ExpenseMonths { .. } => MONTHS_FRESHNESS,
            _ => LIST_FRESHNESS,
        }
    }

    fn cache_key(&self) -> String {
        match self {
            Self::ExpenseList { building_id, month } => format!(
                "expenses/list/{}/{}",
                building_id,
                month.as_deref().unwrap_or("-")
            ),
            Self::ExpenseMonths { building_id } => {
                format!("expenses/months/{}", building_id)
            }
            Self::ProjectList => "projects/list".to_string(),
            Self::ProjectDetail { id } => format!("projects/detail/{}", id),
            Self::ProviderList => "providers/list".to_string(),
            Self::BuildingList => "buildings/list".to_string(),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

#[derive(Clone)]
struct CachedEntry {
    body: Arc<str>,
    fetched_at: Instant,
}

impl CachedEntry {
    fn new(body: String) -> Self {
        Self {
            body: body.into(),
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() <= window
    }
}

/// Shared query cache, created once at application start.
///
/// Cheap to clone; all clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<String, CachedEntry>,
    /// Keys with a background refresh already in flight
    refreshing: Arc<DashMap<String, ()>>,
    /// Keys already prefetched this session
    prefetched: Arc<DashMap<String, ()>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(HARD_TTL)
            .build();
        Self {
            entries,
            refreshing: Arc::new(DashMap::new()),
            prefetched: Arc::new(DashMap::new()),
        }
    }

    /// Read through the cache.
    ///
    /// Fresh hit: returns the cached value, no network. Stale hit:
    /// returns the stale value and refreshes in the background. Miss:
    /// loads via a coalesced fetch shared by concurrent callers.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache_key = key.cache_key();

        if let Some(entry) = self.entries.get(&cache_key).await {
            if !entry.is_fresh(key.freshness()) {
                debug!(key = %cache_key, "Serving stale value, revalidating in background");
                self.spawn_refresh(cache_key.clone(), fetch);
            }
            return Ok(serde_json::from_str(&entry.body)?);
        }

        let loaded = self
            .entries
            .try_get_with(cache_key, async move {
                let value = fetch().await?;
                let body = serde_json::to_string(&value)?;
                Ok::<_, Error>(CachedEntry::new(body))
            })
            .await
            .map_err(|e| reshape_shared_error(&e))?;

        Ok(serde_json::from_str(&loaded.body)?)
    }

    fn spawn_refresh<T, F, Fut>(&self, cache_key: String, fetch: F)
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        // Single-flight: only one refresh per key at a time.
        if self.refreshing.insert(cache_key.clone(), ()).is_some() {
            return;
        }
        let entries = self.entries.clone();
        let refreshing = self.refreshing.clone();
        tokio::spawn(async move {
            match fetch().await {
                Ok(value) => match serde_json::to_string(&value) {
                    Ok(body) => {
                        entries.insert(cache_key.clone(), CachedEntry::new(body)).await;
                        debug!(key = %cache_key, "Background refresh complete");
                    }
                    Err(e) => warn!(key = %cache_key, %e, "Failed to serialize refreshed value"),
                },
                Err(e) => {
                    // The stale value stays; the next read retries.
                    debug!(key = %cache_key, %e, "Background refresh failed, keeping stale value");
                }
            }
            refreshing.remove(&cache_key);
        });
    }

    /// Populate a key ahead of an anticipated navigation.
    ///
    /// Debounced and guarded so repeat requests within one session do
    /// no extra work.
    pub fn prefetch<T, F, Fut>(&self, key: &QueryKey, fetch: F)
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache_key = key.cache_key();
        if self.prefetched.insert(cache_key.clone(), ()).is_some() {
            return;
        }
        let entries = self.entries.clone();
        let freshness = key.freshness();
        tokio::spawn(async move {
            tokio::time::sleep(PREFETCH_DEBOUNCE).await;
            if let Some(entry) = entries.get(&cache_key).await {
                if entry.is_fresh(freshness) {
                    return;
                }
            }
            match fetch().await {
                Ok(value) => {
                    if let Ok(body) = serde_json::to_string(&value) {
                        entries.insert(cache_key, CachedEntry::new(body)).await;
                    }
                }
                Err(e) => debug!(key = %cache_key, %e, "Prefetch failed"),
            }
        });
    }

    /// Drop every cached key of a resource kind. Called after a
    /// successful mutation so the next read refetches.
    pub async fn invalidate_resource(&self, resource: &str) {
        let prefix = format!("{}/", resource);
        let stale_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.to_string())
            .collect();
        let count = stale_keys.len();
        for key in stale_keys {
            self.entries.invalidate(&key).await;
        }
        self.prefetched.retain(|key, _| !key.starts_with(&prefix));
        debug!(resource, count, "Invalidated cached queries");
    }

    /// Number of cached entries (diagnostics only; moka counts lazily).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    #[cfg(test)]
    async fn age_entry(&self, key: &QueryKey) {
        let cache_key = key.cache_key();
        if let Some(entry) = self.entries.get(&cache_key).await {
            let aged = CachedEntry {
                body: entry.body.clone(),
                fetched_at: Instant::now() - HARD_TTL / 2,
            };
            self.entries.insert(cache_key, aged).await;
        }
    }
}

/// moka shares loader errors between coalesced callers as `Arc<Error>`;
/// rebuild an owned error preserving the variants the API layer maps to
/// status codes.
fn reshape_shared_error(e: &Error) -> Error {
    match e {
        Error::NotFound(m) => Error::NotFound(m.clone()),
        Error::InvalidData(m) => Error::InvalidData(m.clone()),
        Error::Config(m) => Error::Config(m.clone()),
        Error::Store { status, message } => Error::Store {
            status: *status,
            message: message.clone(),
        },
        other => Error::Cache(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> QueryKey {
        QueryKey::ExpenseList {
            building_id: "b1".to_string(),
            month: Some("2024-11".to_string()),
        }
    }

    fn counting_fetch(
        counter: Arc<AtomicUsize>,
        value: Vec<String>,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send>> {
        move || {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
        }
    }

    #[tokio::test]
    async fn fresh_hit_skips_the_fetcher() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["a".into()]))
            .await
            .unwrap();
        assert_eq!(first, vec!["a"]);

        let second: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["b".into()]))
            .await
            .unwrap();
        // Cached value wins, fetcher not invoked again.
        assert_eq!(second, vec!["a"]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["a".into()]))
            .await
            .unwrap();
        cache.invalidate_resource("expenses").await;

        let after: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["b".into()]))
            .await
            .unwrap();
        assert_eq!(after, vec!["b"]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_the_resource() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _: Vec<String> = cache
            .get_or_fetch(
                &QueryKey::ProjectList,
                counting_fetch(counter.clone(), vec!["p".into()]),
            )
            .await
            .unwrap();
        cache.invalidate_resource("expenses").await;

        let again: Vec<String> = cache
            .get_or_fetch(
                &QueryKey::ProjectList,
                counting_fetch(counter.clone(), vec!["other".into()]),
            )
            .await
            .unwrap();
        assert_eq!(again, vec!["p"]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let slow_fetch = |counter: Arc<AtomicUsize>| {
            move || {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["x".to_string()])
                })
                    as std::pin::Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send>>
            }
        };

        let k = key();
        let (a, b) = tokio::join!(
            cache.get_or_fetch::<Vec<String>, _, _>(&k, slow_fetch(counter.clone())),
            cache.get_or_fetch::<Vec<String>, _, _>(&k, slow_fetch(counter.clone())),
        );
        assert_eq!(a.unwrap(), vec!["x"]);
        assert_eq!(b.unwrap(), vec!["x"]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_value_served_while_revalidating() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["old".into()]))
            .await
            .unwrap();
        cache.age_entry(&key()).await;

        // Stale read resolves immediately with the old value.
        let stale: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["new".into()]))
            .await
            .unwrap();
        assert_eq!(stale, vec!["old"]);

        // Give the background refresh time to land.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let refreshed: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["unused".into()]))
            .await
            .unwrap();
        assert_eq!(refreshed, vec!["new"]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn prefetch_is_guarded_per_key() {
        let cache = QueryCache::new();
        let counter = Arc::new(AtomicUsize::new(0));

        cache.prefetch(&key(), counting_fetch(counter.clone(), vec!["p".into()]));
        cache.prefetch(&key(), counting_fetch(counter.clone(), vec!["q".into()]));

        tokio::time::sleep(PREFETCH_DEBOUNCE + Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // The prefetched value is now a cache hit.
        let value: Vec<String> = cache
            .get_or_fetch(&key(), counting_fetch(counter.clone(), vec!["r".into()]))
            .await
            .unwrap();
        assert_eq!(value, vec!["p"]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_its_error_kind() {
        let cache = QueryCache::new();
        let result: Result<Vec<String>> = cache
            .get_or_fetch(
                &QueryKey::ProjectDetail {
                    id: "missing".to_string(),
                },
                || async { Err(Error::NotFound("Project missing not found".to_string())) },
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
