//! Caching utilities for videoparser

use moka::future::Cache;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// In-memory cache with per-entry TTL.
///
/// Staleness is checked on read. A read that finds a stale entry sweeps
/// every stale entry from the store, not only the queried key.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    cache: Arc<Mutex<HashMap<K, CachedValue<V>>>>,
    default_ttl: Duration,
}

#[derive(Clone)]
struct CachedValue<V> {
    value: V,
    expires_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CachedValue<V>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut cache = self.lock();
        let expires_at = cache.get(key)?.expires_at;
        if expires_at > now {
            return cache.get(key).map(|cached| cached.value.clone());
        }
        cache.retain(|_, cached| cached.expires_at > now);
        None
    }

    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        self.insert_at(key, value, ttl, Instant::now());
    }

    /// Insert with the cache's default TTL
    pub fn set(&self, key: K, value: V) {
        self.insert(key, value, self.default_ttl);
    }

    pub fn insert_at(&self, key: K, value: V, ttl: Duration, now: Instant) {
        self.lock().insert(
            key,
            CachedValue {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stale entry
    pub fn cleanup_expired(&self) {
        self.cleanup_expired_at(Instant::now());
    }

    pub fn cleanup_expired_at(&self, now: Instant) {
        self.lock().retain(|_, cached| cached.expires_at > now);
    }
}

/// High-performance async cache using moka
pub type AsyncCache<K, V> = Cache<K, V>;

/// Create a new async cache with TTL
pub fn new_async_cache<K, V>(ttl: Duration) -> AsyncCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder().time_to_live(ttl).build()
}
