//! Storage Module
//!
//! The durable record of every message. The store owns id assignment and the
//! derived `expires_at` field.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Message, MessageId, NewMessage};

pub use memory::MemoryRecordStore;

/// Durable message storage.
///
/// Implementations validate on every write, recompute `expires_at` from the
/// record's timeout at save time, and write each record atomically. Backend
/// faults are reported as `ChatError::DurableStore`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Validates, stamps expiry, assigns an id and persists.
    async fn create(&self, new: NewMessage) -> Result<Message>;

    /// Fetches a record regardless of whether it has expired.
    async fn get_by_id(&self, id: MessageId) -> Result<Message>;

    /// Records for `recipient` with `expires_at > as_of`, in creation order.
    async fn filter_unexpired(&self, recipient: &str, as_of: DateTime<Utc>)
        -> Result<Vec<Message>>;

    /// Re-validates, recomputes expiry from the current timeout and saves in
    /// place. Returns the record as persisted.
    async fn update(&self, message: Message) -> Result<Message>;
}
