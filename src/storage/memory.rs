//! In-process record store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::models::{Message, MessageId, NewMessage};
use crate::storage::RecordStore;

#[derive(Debug)]
struct Records {
    next_id: MessageId,
    /// Keyed by id; ids grow monotonically, so key order is creation order
    rows: BTreeMap<MessageId, Message>,
}

/// Record store held in memory for the lifetime of the process.
///
/// Writes happen under one lock, so a reader sees a record either before or
/// after a write, never in between.
#[derive(Debug)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.rows.len()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, new: NewMessage) -> Result<Message> {
        new.validate()?;

        let mut records = self.records.write().await;
        let id = records.next_id;
        records.next_id = id
            .checked_add(1)
            .ok_or_else(|| ChatError::DurableStore("message id space exhausted".to_string()))?;

        let message = new.into_message(id, Utc::now());
        records.rows.insert(id, message.clone());
        debug!("Stored message {} for {}", id, message.recipient);

        Ok(message)
    }

    async fn get_by_id(&self, id: MessageId) -> Result<Message> {
        self.records
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(ChatError::NotFound(id))
    }

    async fn filter_unexpired(
        &self,
        recipient: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        let records = self.records.read().await;
        Ok(records
            .rows
            .values()
            .filter(|m| m.recipient == recipient && !m.is_expired_at(as_of))
            .cloned()
            .collect())
    }

    async fn update(&self, mut message: Message) -> Result<Message> {
        message.validate()?;
        message.refresh_expiry(Utc::now());

        let mut records = self.records.write().await;
        match records.rows.get_mut(&message.id) {
            Some(row) => {
                *row = message.clone();
                Ok(message)
            }
            None => Err(ChatError::DurableStore(format!(
                "cannot update message {}: no such record",
                message.id
            ))),
        }
    }
}
