//! Message records and their projections
//!
//! A `Message` is the durable record; `MessageView` and `MessageSummary` are
//! the subsets exposed by the single-item and per-recipient read paths.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, Result};

/// Identifier assigned by the durable store on creation.
pub type MessageId = u64;

// == Public Constants ==
/// Maximum recipient length in characters
pub const MAX_RECIPIENT_LENGTH: usize = 200;

/// Maximum body length in characters
pub const MAX_BODY_LENGTH: usize = 512;

/// Timeout applied when a creation request does not carry one
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Largest accepted timeout, matching a positive 32-bit integer column
pub const MAX_TIMEOUT_SECS: u64 = 2_147_483_647;

// == Message ==
/// The durable record of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub recipient: String,
    pub body: String,
    pub timeout_seconds: u64,
    /// Derived from `timeout_seconds` on every save, never client supplied
    pub expires_at: DateTime<Utc>,
}

impl Message {
    /// Projection served by `GET /chat/{id}` and stored in the cache.
    pub fn view(&self) -> MessageView {
        MessageView {
            recipient: self.recipient.clone(),
            body: self.body.clone(),
            expires_at: self.expires_at,
        }
    }

    /// Projection served by the per-recipient listing.
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.id,
            body: self.body.clone(),
        }
    }

    /// Re-runs the field checks applied at creation.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.recipient, &self.body, self.timeout_seconds)
    }

    /// Recomputes `expires_at` from the current timeout as of `now`.
    pub fn refresh_expiry(&mut self, now: DateTime<Utc>) {
        self.expires_at = expiry_from(now, self.timeout_seconds);
    }

    pub fn is_expired_at(&self, as_of: DateTime<Utc>) -> bool {
        self.expires_at <= as_of
    }
}

// == New Message ==
/// Validated creation input, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub recipient: String,
    pub body: String,
    pub timeout_seconds: u64,
}

impl NewMessage {
    pub fn new(recipient: impl Into<String>, body: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            recipient: recipient.into(),
            body: body.into(),
            timeout_seconds,
        }
    }

    /// Checks bounds on every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.recipient, &self.body, self.timeout_seconds)
    }

    /// Turns the input into a full record with the given id, stamped at `now`.
    pub fn into_message(self, id: MessageId, now: DateTime<Utc>) -> Message {
        Message {
            id,
            expires_at: expiry_from(now, self.timeout_seconds),
            recipient: self.recipient,
            body: self.body,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

// == Projections ==
/// Recipient, body and expiry. The id is the cache key, so it is not repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub recipient: String,
    pub body: String,
    pub expires_at: DateTime<Utc>,
}

/// Id and body, as returned by the per-recipient listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: MessageId,
    pub body: String,
}

// == Validation Helpers ==
fn check_fields(recipient: &str, body: &str, timeout_seconds: u64) -> Result<()> {
    let mut errors = FieldErrors::new();
    check_recipient(&mut errors, recipient);
    check_body(&mut errors, body);
    check_timeout(&mut errors, timeout_seconds);
    errors.into_result()
}

pub(crate) fn check_recipient(errors: &mut FieldErrors, recipient: &str) {
    if recipient.trim().is_empty() {
        errors.add("recipient", "This field may not be blank.");
    } else if recipient.chars().count() > MAX_RECIPIENT_LENGTH {
        errors.add(
            "recipient",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_RECIPIENT_LENGTH
            ),
        );
    }
}

pub(crate) fn check_body(errors: &mut FieldErrors, body: &str) {
    if body.trim().is_empty() {
        errors.add("body", "This field may not be blank.");
    } else if body.chars().count() > MAX_BODY_LENGTH {
        errors.add(
            "body",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_BODY_LENGTH
            ),
        );
    }
}

pub(crate) fn check_timeout(errors: &mut FieldErrors, timeout_seconds: u64) {
    if timeout_seconds > MAX_TIMEOUT_SECS {
        errors.add(
            "timeout_seconds",
            format!(
                "Ensure this value is less than or equal to {}.",
                MAX_TIMEOUT_SECS
            ),
        );
    }
}

/// `now + timeout_seconds`, saturating at the latest representable instant.
pub fn expiry_from(now: DateTime<Utc>, timeout_seconds: u64) -> DateTime<Utc> {
    i64::try_from(timeout_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
