//! In-process expiring cache backed by `CacheStore`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore, ExpiringCache};
use crate::error::TransientStoreError;
use crate::models::{MessageId, MessageView};

/// Shares one `CacheStore` between concurrent requests.
///
/// Every operation takes the write lock for a single key, so operations are
/// atomic per key and concurrent `set`s resolve as last writer wins.
#[derive(Debug)]
pub struct MemoryCache {
    store: RwLock<CacheStore>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(max_entries)),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Drops expired entries; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl ExpiringCache for MemoryCache {
    async fn set(
        &self,
        key: MessageId,
        value: MessageView,
        ttl_seconds: u64,
    ) -> Result<(), TransientStoreError> {
        self.store.write().await.set(key, value, ttl_seconds)
    }

    async fn get(&self, key: MessageId) -> Result<Option<MessageView>, TransientStoreError> {
        // Write lock: reads touch LRU order and counters
        Ok(self.store.write().await.get(key))
    }

    async fn expire_now(&self, key: MessageId) -> Result<(), TransientStoreError> {
        self.store.write().await.expire_now(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn view(body: &str) -> MessageView {
        MessageView {
            recipient: "kiran".to_string(),
            body: body.to_string(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_set_get_expire() {
        let cache = MemoryCache::new(10);

        cache.set(1, view("hello"), 60).await.unwrap();
        assert_eq!(cache.get(1).await.unwrap().unwrap().body, "hello");

        cache.expire_now(1).await.unwrap();
        assert!(cache.get(1).await.unwrap().is_none());

        // Expiring again, or a key never set, is not an error
        tokio_test::assert_ok!(cache.expire_now(1).await);
        tokio_test::assert_ok!(cache.expire_now(77).await);
    }

    #[tokio::test]
    async fn test_expired_entries_swept() {
        let cache = MemoryCache::new(10);

        cache.set(1, view("a"), 0).await.unwrap();
        cache.set(2, view("b"), 60).await.unwrap();
        cache.expire_now(2).await.unwrap();
        cache.set(3, view("c"), 60).await.unwrap();

        assert_eq!(cache.cleanup_expired().await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_sets_keep_one_entry() {
        let cache = Arc::new(MemoryCache::new(10));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.set(5, view(&format!("v{i}")), 60).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(5).await.unwrap().unwrap().body.starts_with('v'));
    }

    #[tokio::test]
    async fn test_stats_reflect_reads() {
        let cache = MemoryCache::new(10);
        cache.set(1, view("a"), 60).await.unwrap();
        cache.get(1).await.unwrap();
        cache.get(2).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
