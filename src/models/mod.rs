//! Message records and the DTOs used by the HTTP API
//!
//! This module defines the durable record, its read projections and the
//! request/response bodies serialized over HTTP.

pub mod message;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use message::{
    Message, MessageId, MessageSummary, MessageView, NewMessage, DEFAULT_TIMEOUT_SECS,
    MAX_BODY_LENGTH, MAX_RECIPIENT_LENGTH,
};
pub use requests::CreateMessageRequest;
pub use responses::{CacheStatsResponse, ErrorResponse, HealthResponse, ServiceDescription};
