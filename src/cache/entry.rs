//! Cache Entry Module
//!
//! A cached message projection together with its absolute expiry.

use chrono::Utc;

use crate::models::MessageView;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached projection
    pub value: MessageView,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl_seconds` from now.
    ///
    /// A zero TTL produces an entry that is already expired.
    pub fn new(value: MessageView, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time,
    /// so the boundary instant itself already counts as expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Expire Now ==
    /// Pulls the expiration time back to the present.
    pub fn expire_now(&mut self) {
        self.expires_at = self.expires_at.min(current_timestamp_ms());
    }

}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn view(body: &str) -> MessageView {
        MessageView {
            recipient: "kiran".to_string(),
            body: body.to_string(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(view("hello"), 60);

        assert_eq!(entry.value.body, "hello");
        assert_eq!(entry.expires_at, entry.created_at + 60_000);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let entry = CacheEntry::new(view("gone"), 0);
        assert!(entry.is_expired());
        assert_eq!(entry.expires_at, entry.created_at);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(view("short"), 1);

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expire_now() {
        let mut entry = CacheEntry::new(view("hello"), 3600);
        entry.expire_now();

        assert!(entry.is_expired());
        assert!(entry.expires_at <= current_timestamp_ms());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new(view("forever"), u64::MAX);
        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired());
    }
}
