//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage with LRU tracking and absolute
//! per-entry expiry. Callers provide their own locking.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::TransientStoreError;
use crate::models::{MessageId, MessageView};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<MessageId, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    /// Creates an empty store holding at most `max_entries` projections.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// Overwrites any existing entry and resets its TTL. At capacity expired
    /// entries are swept first; the least recently used live entry is only
    /// evicted if that frees nothing.
    pub fn set(
        &mut self,
        key: MessageId,
        value: MessageView,
        ttl_seconds: u64,
    ) -> Result<(), TransientStoreError> {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            self.cleanup_expired();
        }

        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(TransientStoreError(
                        "cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        self.entries.insert(key, CacheEntry::new(value, ttl_seconds));
        self.lru.touch(key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the projection if present and unexpired.
    ///
    /// Expired entries are dropped on sight and counted as misses.
    pub fn get(&mut self, key: MessageId) -> Option<MessageView> {
        match self.entries.get(&key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            Some(_) => {
                self.remove(key);
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Expire Now ==
    /// Forces `key` to expire immediately. Absent keys are a no-op.
    ///
    /// The entry stays in place until the next read or sweep drops it.
    pub fn expire_now(&mut self, key: MessageId) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.expire_now();
        }
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats;
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<MessageId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(&key, _)| key)
            .collect();

        for &key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: MessageId) {
        self.entries.remove(&key);
        self.lru.remove(key);
        self.stats.set_total_entries(self.entries.len());
    }
}
