//! Response DTOs for the message API
//!
//! Defines the structure of outgoing HTTP response bodies. Message bodies
//! themselves are served straight from the projections in `message`.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::error::FieldErrors;

/// Response body for the service description (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescription {
    pub description: String,
    pub endpoints: Vec<String>,
}

impl ServiceDescription {
    pub fn current() -> Self {
        Self {
            description: "EphemeralMessages API".to_string(),
            endpoints: vec![
                "POST /chat".to_string(),
                "GET /chat/{id}".to_string(),
                "GET /chats/{recipient}".to_string(),
            ],
        }
    }
}

/// Cache section of the health response
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheStatsResponse,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(stats: CacheStats) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache: stats.into(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Per-field detail, present on validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }

    pub fn with_fields(error: impl Into<String>, fields: FieldErrors) -> Self {
        Self {
            error: error.into(),
            fields: Some(fields),
        }
    }
}
