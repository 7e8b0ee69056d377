//! A moka cache whose entries carry invalidation tags.
//!
//! Invalidation never walks the cache eagerly: moka records the predicate
//! and stops returning matching entries right away, evicting them in the
//! background. The predicate only covers entries already written, so every
//! invalidation also bumps a generation counter, and a load that started
//! under an older generation does not outlive the invalidation.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::metrics_consts::{CACHE_HIT_COUNTER, CACHE_INVALIDATION_COUNTER, CACHE_MISS_COUNTER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Hit,
    Loaded,
}

#[derive(Debug, Clone)]
pub struct Tagged<V> {
    pub value: V,
    pub tags: Arc<[String]>,
}

impl<V> Tagged<V> {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

#[derive(Clone)]
pub struct TaggedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Cache<K, Tagged<V>>,
    generation: Arc<AtomicU64>,
}

impl<K, V> TaggedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder()
            .name(name)
            .max_capacity(max_capacity)
            .support_invalidation_closures();
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        TaggedCache {
            name,
            inner: builder.build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.get(key).await.map(|entry| entry.value);
        self.record_lookup(value.is_some());
        value
    }

    pub async fn insert(&self, key: K, value: V, tags: &[&str]) {
        let tags: Arc<[String]> = tags.iter().map(|tag| tag.to_string()).collect();
        self.inner.insert(key, Tagged { value, tags }).await;
    }

    /// Number of invalidations so far. Read it before computing a value that
    /// is later passed to [`Self::insert_unless_invalidated`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Inserts a value computed while the cache was at generation `seen`.
    /// If an invalidation happened since, the value is dropped again and
    /// `false` is returned.
    pub async fn insert_unless_invalidated(
        &self,
        key: K,
        value: V,
        tags: &[&str],
        seen: u64,
    ) -> bool {
        self.insert(key.clone(), value, tags).await;
        if self.generation() == seen {
            return true;
        }
        self.inner.invalidate(&key).await;
        tracing::debug!(cache = self.name, "discarded value computed before an invalidation");
        false
    }

    /// Returns the cached value, or runs `load` and caches its result under `tags`.
    /// Concurrent callers for the same key share a single load.
    pub async fn get_or_try_load<F, E>(
        &self,
        key: K,
        tags: &[&str],
        load: F,
    ) -> Result<(V, CacheSource), Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let tags: Arc<[String]> = tags.iter().map(|tag| tag.to_string()).collect();
        let seen = self.generation();
        let entry = self
            .inner
            .entry(key.clone())
            .or_try_insert_with(async move {
                let value = load.await?;
                Ok(Tagged { value, tags })
            })
            .await?;

        let source = if entry.is_fresh() {
            CacheSource::Loaded
        } else {
            CacheSource::Hit
        };
        self.record_lookup(source == CacheSource::Hit);

        // Loaded from a source that may predate an invalidation issued
        // while the load ran: hand it to this caller but do not keep it.
        if source == CacheSource::Loaded && self.generation() != seen {
            self.inner.invalidate(&key).await;
            tracing::debug!(cache = self.name, "discarded load that raced an invalidation");
        }

        Ok((entry.into_value().value, source))
    }

    pub fn invalidate_tag(&self, tag: &str) -> Result<(), moka::PredicateError> {
        let tag = tag.to_string();
        self.invalidate_where(move |_, entry| entry.has_tag(&tag))
    }

    /// Stops serving every entry matching `predicate`.
    pub fn invalidate_where<F>(&self, predicate: F) -> Result<(), moka::PredicateError>
    where
        F: Fn(&K, &Tagged<V>) -> bool + Send + Sync + 'static,
    {
        // Bumped before the predicate is registered, so a write is either
        // covered by the predicate or seen by its loader as stale.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_entries_if(predicate)?;
        metrics::counter!(CACHE_INVALIDATION_COUNTER, "cache" => self.name).increment(1);
        Ok(())
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            metrics::counter!(CACHE_HIT_COUNTER, "cache" => self.name).increment(1);
        } else {
            metrics::counter!(CACHE_MISS_COUNTER, "cache" => self.name).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> TaggedCache<String, u32> {
        TaggedCache::new("test", 100, None)
    }

    #[tokio::test]
    async fn test_loads_once_then_hits() {
        let cache = cache();
        let loads = AtomicUsize::new(0);

        for expected in [CacheSource::Loaded, CacheSource::Hit, CacheSource::Hit] {
            let (value, source) = cache
                .get_or_try_load("key".to_string(), &["tag"], async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
            assert_eq!(source, expected);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = cache();

        let result = cache
            .get_or_try_load("key".to_string(), &[], async {
                Err::<u32, _>(std::io::Error::other("boom"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_tag_only_drops_tagged_entries() {
        let cache = cache();
        cache.insert("a".to_string(), 1, &["products"]).await;
        cache.insert("b".to_string(), 2, &["other"]).await;

        cache.invalidate_tag("products").unwrap();

        assert_eq!(cache.get(&"a".to_string()).await, None);
        assert_eq!(cache.get(&"b".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn test_load_finishing_after_invalidation_is_not_kept() {
        let cache = cache();
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());

        let inflight = tokio::spawn({
            let cache = cache.clone();
            let started = started.clone();
            let release = release.clone();
            async move {
                cache
                    .get_or_try_load("key".to_string(), &["products"], async move {
                        started.notify_one();
                        release.notified().await;
                        Ok::<_, std::io::Error>(1)
                    })
                    .await
            }
        });

        started.notified().await;
        cache.invalidate_tag("products").unwrap();
        release.notify_one();

        let (value, source) = inflight.await.unwrap().unwrap();
        assert_eq!((value, source), (1, CacheSource::Loaded));
        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_insert_unless_invalidated() {
        let cache = cache();

        let seen = cache.generation();
        assert!(cache.insert_unless_invalidated("a".to_string(), 1, &[], seen).await);
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));

        let seen = cache.generation();
        cache.invalidate_tag("unrelated").unwrap();
        assert!(!cache.insert_unless_invalidated("b".to_string(), 2, &[], seen).await);
        assert_eq!(cache.get(&"b".to_string()).await, None);
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
    }
}
