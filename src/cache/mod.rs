//! Cache Module
//!
//! The fast, expiring side of the message store: message projections keyed by
//! id, each with its own TTL.

mod entry;
mod lru;
mod memory;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use async_trait::async_trait;

use crate::error::TransientStoreError;
use crate::models::{MessageId, MessageView};

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::MemoryCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Expiring Cache ==
/// Key to projection store with per-key TTL.
///
/// Each operation is atomic for the key it touches. Any backend fault is
/// reported as a `TransientStoreError`; an absent or expired key is not a fault.
#[async_trait]
pub trait ExpiringCache: Send + Sync {
    /// Stores `value` under `key`, replacing any entry and resetting its TTL.
    async fn set(
        &self,
        key: MessageId,
        value: MessageView,
        ttl_seconds: u64,
    ) -> Result<(), TransientStoreError>;

    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: MessageId) -> Result<Option<MessageView>, TransientStoreError>;

    /// Expires `key` immediately regardless of remaining TTL. Idempotent.
    async fn expire_now(&self, key: MessageId) -> Result<(), TransientStoreError>;
}
