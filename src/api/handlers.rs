//! API Handlers
//!
//! HTTP request handlers for each message endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::api::extractors::{ClientIdentity, ClientResolver};
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::models::{
    CreateMessageRequest, HealthResponse, Message, MessageId, MessageSummary, MessageView,
    ServiceDescription,
};
use crate::rate_limit::RateLimiter;
use crate::service::MessageService;
use crate::storage::MemoryRecordStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MessageService,
    /// Concrete cache handle, for statistics and sweeping
    pub cache: Arc<MemoryCache>,
    pub limiter: Arc<RateLimiter>,
    pub resolver: ClientResolver,
    /// Timeout applied when a request carries none
    pub default_timeout: u64,
}

impl AppState {
    /// Wires in-memory collaborators from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        let store = Arc::new(MemoryRecordStore::new());
        let service = MessageService::new(cache.clone(), store)
            .with_timeouts(config.cache_op_timeout, config.store_op_timeout);

        Self {
            service,
            cache,
            limiter: Arc::new(RateLimiter::new(config.throttle_rate)),
            resolver: ClientResolver::new(config.trusted_proxies.clone()),
            default_timeout: config.default_timeout,
        }
    }
}

impl FromRef<AppState> for ClientResolver {
    fn from_ref(state: &AppState) -> Self {
        state.resolver.clone()
    }
}

/// Handler for GET /
pub async fn index_handler() -> Json<ServiceDescription> {
    debug!("Service description requested");
    Json(ServiceDescription::current())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.stats().await))
}

/// Handler for POST /chat
///
/// Rate limited per client before the body is even looked at.
pub async fn create_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    payload: std::result::Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>)> {
    state.limiter.check(&identity)?;

    let Json(req) = payload.map_err(|rejection| {
        ChatError::invalid_field("non_field_errors", rejection.body_text())
    })?;
    let new = req.into_new_message(state.default_timeout)?;
    let message = state.service.create_message(new).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Handler for GET /chat/:id
///
/// Returns expired messages too; only the cache applies a TTL.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
) -> Result<Json<MessageView>> {
    Ok(Json(state.service.get_message(id).await?))
}

/// Handler for GET /chats/:recipient
///
/// Lists unexpired messages and consumes them.
pub async fn list_handler(
    State(state): State<AppState>,
    Path(recipient): Path<String>,
) -> Result<Json<Vec<MessageSummary>>> {
    Ok(Json(state.service.list_and_consume(&recipient).await?))
}
