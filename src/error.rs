//! Error types for the message service
//!
//! Every collaborator fault is normalized into one of these types before it
//! crosses a layer boundary.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::{ErrorResponse, MessageId};

// == Field Errors ==
/// Field-level validation detail, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem with `field`. Multiple problems per field are kept.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ChatError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

// == Transient Store Error ==
/// Any fault raised by the expiring cache.
///
/// Recoverable: the lifecycle manager falls back to the durable store on reads
/// and logs-and-continues on writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cache unavailable: {0}")]
pub struct TransientStoreError(pub String);

// == Chat Error Enum ==
/// Unified error type surfaced by the lifecycle manager and the HTTP layer.
#[derive(Error, Debug, Clone)]
pub enum ChatError {
    /// Malformed or out-of-bounds input
    #[error("Invalid message: {0}")]
    Validation(FieldErrors),

    /// Id absent from both the cache and the durable store
    #[error("Message not found: {0}")]
    NotFound(MessageId),

    /// Constraint violation, connectivity loss or data fault in the durable store
    #[error("Durable store error: {0}")]
    DurableStore(String),

    /// Creation quota exhausted for the caller
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },
}

impl ChatError {
    /// Builds a validation error carrying a single field problem.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        ChatError::Validation(errors)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            ChatError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_fields("Invalid message", fields)),
            )
                .into_response(),
            // Missing ids are a client error in this API, not a 404.
            ChatError::NotFound(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Chat id does not exist")),
            )
                .into_response(),
            ChatError::DurableStore(detail) => {
                error!("Request failed on durable store: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
            ChatError::RateLimitExceeded { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(ErrorResponse::new(format!(
                    "Request was throttled. Expected available in {} seconds.",
                    retry_after_secs
                ))),
            )
                .into_response(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the message service.
pub type Result<T> = std::result::Result<T, ChatError>;
