//! Request DTOs for the message API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FieldErrors, Result};
use crate::models::message::{check_body, check_recipient, check_timeout, NewMessage};

const REQUIRED: &str = "This field is required.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Request body for message creation (POST /chat)
///
/// Fields are kept loosely typed so that a bad value becomes a field-level
/// error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMessageRequest {
    /// The addressee
    #[serde(default, alias = "username")]
    pub recipient: Option<String>,
    /// The message content
    #[serde(default, alias = "text")]
    pub body: Option<String>,
    /// Seconds the message lives before expiring
    #[serde(default, alias = "timeout")]
    pub timeout_seconds: Option<Value>,
}

impl CreateMessageRequest {
    /// Validates the request, filling in `default_timeout` when none was sent.
    ///
    /// All field problems are reported together.
    pub fn into_new_message(self, default_timeout: u64) -> Result<NewMessage> {
        let mut errors = FieldErrors::new();

        match &self.recipient {
            Some(recipient) => check_recipient(&mut errors, recipient),
            None => errors.add("recipient", REQUIRED),
        }
        match &self.body {
            Some(body) => check_body(&mut errors, body),
            None => errors.add("body", REQUIRED),
        }
        let timeout_seconds = match parse_timeout(self.timeout_seconds.as_ref(), default_timeout) {
            Ok(secs) => {
                check_timeout(&mut errors, secs);
                secs
            }
            Err(reason) => {
                errors.add("timeout_seconds", reason);
                default_timeout
            }
        };

        errors.into_result()?;

        Ok(NewMessage {
            recipient: self.recipient.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            timeout_seconds,
        })
    }
}

/// Accepts JSON integers and integer strings; `null` or absent means default.
fn parse_timeout(raw: Option<&Value>, default_timeout: u64) -> std::result::Result<u64, &'static str> {
    match raw {
        None | Some(Value::Null) => Ok(default_timeout),
        Some(Value::Number(n)) => {
            if let Some(secs) = n.as_u64() {
                Ok(secs)
            } else if n.as_i64().is_some() {
                Err(NEGATIVE)
            } else {
                Err(NOT_AN_INTEGER)
            }
        }
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(secs) if secs < 0 => Err(NEGATIVE),
            Ok(secs) => Ok(secs as u64),
            Err(_) => Err(NOT_AN_INTEGER),
        },
        Some(_) => Err(NOT_AN_INTEGER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    fn fields_of(result: Result<NewMessage>) -> FieldErrors {
        match result {
            Err(ChatError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_canonical_names() {
        let json = r#"{"recipient": "kiran", "body": "hello", "timeout_seconds": 30}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();
        let msg = req.into_new_message(60).unwrap();

        assert_eq!(msg, NewMessage::new("kiran", "hello", 30));
    }

    #[test]
    fn test_deserialize_legacy_names() {
        let json = r#"{"username": "kiran", "text": "hello", "timeout": 300}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();
        let msg = req.into_new_message(60).unwrap();

        assert_eq!(msg, NewMessage::new("kiran", "hello", 300));
    }

    #[test]
    fn test_missing_timeout_uses_default() {
        let json = r#"{"username": "kiran", "text": "hello"}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.into_new_message(60).unwrap().timeout_seconds, 60);
    }

    #[test]
    fn test_numeric_string_timeout_accepted() {
        let json = r#"{"username": "kiran", "text": "hello", "timeout": "45"}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.into_new_message(60).unwrap().timeout_seconds, 45);
    }

    #[test]
    fn test_empty_string_timeout_rejected() {
        let json = r#"{"username": "kiran", "text": "hello", "timeout": ""}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();
        let fields = fields_of(req.into_new_message(60));

        assert_eq!(
            fields.get("timeout_seconds").unwrap(),
            [NOT_AN_INTEGER.to_string()]
        );
    }

    #[test]
    fn test_negative_and_fractional_timeouts_rejected() {
        for raw in ["-5", "1.5", "true", "[1]"] {
            let json = format!(r#"{{"username": "kiran", "text": "hello", "timeout": {raw}}}"#);
            let req: CreateMessageRequest = serde_json::from_str(&json).unwrap();
            let fields = fields_of(req.into_new_message(60));
            assert!(fields.get("timeout_seconds").is_some(), "timeout {raw} accepted");
        }
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let req: CreateMessageRequest = serde_json::from_str("{}").unwrap();
        let fields = fields_of(req.into_new_message(60));

        assert_eq!(fields.get("recipient").unwrap(), [REQUIRED.to_string()]);
        assert_eq!(fields.get("body").unwrap(), [REQUIRED.to_string()]);
        assert!(fields.get("timeout_seconds").is_none());
    }
}
