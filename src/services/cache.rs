use std::future::Future;
use std::time::Duration;

/// In-memory TTL cache for per-session state.
///
/// Holds the registry of live sessions and each session's candidate deck.
/// Entries expire after `ttl_secs` of existence; explicit invalidation is
/// used on sign-out.
#[derive(Clone)]
pub struct CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: moka::future::Cache<String, V>,
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache manager
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let value = self.entries.get(key).await;
        if value.is_none() {
            tracing::trace!("Cache miss: {}", key);
        }
        value
    }

    pub async fn set(&self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value).await;
        tracing::trace!("Cache set: {}", key);
    }

    /// Cached value for `key`, or the result of `init` stored under it.
    ///
    /// Concurrent callers for the same key share a single `init` run. A
    /// failed `init` caches nothing and every waiting caller gets the error.
    pub async fn get_or_try_insert_with<F, E>(&self, key: &str, init: F) -> Result<V, E>
    where
        F: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        self.entries
            .try_get_with(key.to_string(), init)
            .await
            .map_err(|e| (*e).clone())
    }

    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a live session
    pub fn session(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    /// Key for a session's candidate deck
    pub fn deck(session_id: &str) -> String {
        format!("deck:{}", session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_set_get_delete() {
        let cache: CacheManager<String> = CacheManager::new(100, 60);

        cache.set("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        cache.delete("k").await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_init() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let cache: CacheManager<Arc<String>> = CacheManager::new(100, 60);
        let counter = AtomicUsize::new(0);
        let runs = &counter;

        let load = move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(Arc::new("deck".to_string()))
        };

        let (a, b) = tokio::join!(
            cache.get_or_try_insert_with("deck:s1", load()),
            cache.get_or_try_insert_with("deck:s1", load()),
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: CacheManager<String> = CacheManager::new(100, 60);

        let err = cache
            .get_or_try_insert_with("k", async { Err::<String, _>("offline".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "offline");
        assert!(cache.get("k").await.is_none());

        let value = cache
            .get_or_try_insert_with("k", async { Ok::<_, String>("v".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "v");
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::session("abc"), "session:abc");
        assert_eq!(CacheKey::deck("abc"), "deck:abc");
    }
}
