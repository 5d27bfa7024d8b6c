//! Message Lifecycle Manager
//!
//! Coordinates the durable record store (source of truth) with the expiring
//! cache (fast path). Cache faults are absorbed here; durable faults are fatal
//! to the request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::ExpiringCache;
use crate::error::{ChatError, Result, TransientStoreError};
use crate::models::{Message, MessageId, MessageSummary, MessageView, NewMessage};
use crate::storage::RecordStore;

/// Default bound on a single cache call
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

/// Default bound on a single durable store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct MessageService {
    cache: Arc<dyn ExpiringCache>,
    store: Arc<dyn RecordStore>,
    cache_timeout: Duration,
    store_timeout: Duration,
}

impl MessageService {
    pub fn new(cache: Arc<dyn ExpiringCache>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            cache,
            store,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Overrides the per-call latency bounds for both collaborators.
    pub fn with_timeouts(mut self, cache_timeout: Duration, store_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self.store_timeout = store_timeout;
        self
    }

    // == Create ==
    /// Writes the message durably, then populates the cache with the same TTL.
    ///
    /// Invalid input is rejected before either store is touched. A failed
    /// cache write is logged and does not undo the durable write.
    pub async fn create_message(&self, new: NewMessage) -> Result<Message> {
        new.validate()?;

        let message = self.durable(self.store.create(new)).await?;
        info!(
            "Created message {} for {} (timeout {}s)",
            message.id, message.recipient, message.timeout_seconds
        );

        let populated = self
            .cached(
                self.cache
                    .set(message.id, message.view(), message.timeout_seconds),
            )
            .await;
        if let Err(err) = populated {
            warn!("Message {} stored without cache entry: {}", message.id, err);
        }

        Ok(message)
    }

    // == Get ==
    /// Cache first, then the durable store.
    ///
    /// The durable fallback does not filter on expiry: a consumed or expired
    /// message is still returned by id.
    pub async fn get_message(&self, id: MessageId) -> Result<MessageView> {
        match self.cached(self.cache.get(id)).await {
            Ok(Some(view)) => {
                debug!("Message {} served from cache", id);
                return Ok(view);
            }
            Ok(None) => debug!("Message {} not in cache", id),
            Err(err) => warn!("Cache read for message {} failed: {}", id, err),
        }

        let message = self.durable(self.store.get_by_id(id)).await?;
        debug!("Message {} served from durable store", id);
        Ok(message.view())
    }

    // == List And Consume ==
    /// Returns every unexpired message for `recipient` in creation order and
    /// consumes each one.
    ///
    /// The response is captured before any consume runs. Consumption is per
    /// message; a durable fault mid-loop fails the request and leaves earlier
    /// messages consumed.
    pub async fn list_and_consume(&self, recipient: &str) -> Result<Vec<MessageSummary>> {
        let now = Utc::now();
        let messages = self
            .durable(self.store.filter_unexpired(recipient, now))
            .await?;
        let summaries: Vec<MessageSummary> = messages.iter().map(Message::summary).collect();

        for message in messages {
            self.consume(message).await?;
        }

        debug!(
            "Consumed {} message(s) for {}",
            summaries.len(),
            recipient
        );
        Ok(summaries)
    }

    // == Consume ==
    /// Zeroes the timeout, saves (which stamps expiry to now) and expires the
    /// cache entry. Safe to repeat on an already consumed message.
    pub async fn consume(&self, mut message: Message) -> Result<Message> {
        let id = message.id;
        message.timeout_seconds = 0;
        let saved = self.durable(self.store.update(message)).await?;

        if let Err(err) = self.cached(self.cache.expire_now(id)).await {
            warn!("Could not expire cache entry for message {}: {}", id, err);
        }

        Ok(saved)
    }

    // == Collaborator Boundaries ==
    async fn durable<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        match timeout(self.store_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::DurableStore(format!(
                "durable store did not answer within {:?}",
                self.store_timeout
            ))),
        }
    }

    async fn cached<T>(
        &self,
        op: impl Future<Output = std::result::Result<T, TransientStoreError>>,
    ) -> std::result::Result<T, TransientStoreError> {
        match timeout(self.cache_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(TransientStoreError(format!(
                "cache did not answer within {:?}",
                self.cache_timeout
            ))),
        }
    }
}

impl std::fmt::Debug for MessageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageService")
            .field("cache_timeout", &self.cache_timeout)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
