//! Bounded memo cache
//!
//! Every pipeline cache (classifier, recognizer, adapter, validator, services)
//! is a `MemoCache` constructed once at startup and shared through `Arc`.
//! Entries are evicted least-recently-used once capacity is reached, and
//! optionally expire after a fixed time-to-live.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// LRU cache with optional TTL
pub struct MemoCache<K: Hash + Eq, V: Clone> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    capacity: NonZeroUsize,
    ttl: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone> MemoCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            ttl,
        }
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Get a live entry, promoting it to most-recently-used
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) => self.is_expired(entry),
            None => return None,
        };

        if expired {
            entries.pop(key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        entries.pop(key).map(|entry| entry.value)
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries (expired entries included until touched)
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache: MemoCache<String, u32> = MemoCache::new(4);
        cache.insert("a".to_string(), 1).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
        assert_eq!(cache.get(&"b".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache: MemoCache<u32, u32> = MemoCache::new(2);
        cache.insert(1, 10).await;
        cache.insert(2, 20).await;
        // Touch 1 so that 2 becomes least recently used
        assert_eq!(cache.get(&1).await, Some(10));
        cache.insert(3, 30).await;

        assert_eq!(cache.get(&2).await, None);
        assert_eq!(cache.get(&1).await, Some(10));
        assert_eq!(cache.get(&3).await, Some(30));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache: MemoCache<u32, u32> = MemoCache::with_ttl(4, Some(Duration::from_millis(20)));
        cache.insert(1, 10).await;
        assert_eq!(cache.get(&1).await, Some(10));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(&1).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache: MemoCache<u32, u32> = MemoCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(1, 10).await;
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
