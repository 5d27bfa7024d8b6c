//! Creation Rate Limiter
//!
//! Per-identity quota backed by a keyed `governor` limiter: an identity may
//! spend `quota` attempts at once, and regains one every `period / quota`.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ChatError, Result};

type KeyedLimiter = governor::RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

// == Rate ==
/// `quota` attempts per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub quota: u32,
    pub period: Duration,
}

impl Rate {
    pub fn new(quota: u32, period: Duration) -> Self {
        Self { quota, period }
    }

    pub fn per_day(quota: u32) -> Self {
        Self::new(quota, Duration::from_secs(86_400))
    }

    /// The equivalent GCRA quota, or `None` when nothing is ever admitted.
    fn to_quota(self) -> Option<Quota> {
        let burst = NonZeroU32::new(self.quota)?;
        let quota = Quota::with_period(self.period / self.quota)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Some(quota)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::per_day(1)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.quota, self.period.as_secs())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid rate '{0}', expected N/second, N/minute, N/hour or N/day")]
pub struct InvalidRate(String);

impl FromStr for Rate {
    type Err = InvalidRate;

    /// Parses `"N/unit"`, where unit is `second`, `minute`, `hour` or `day`
    /// (only the first letter is significant).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || InvalidRate(s.to_string());
        let (quota, unit) = s.split_once('/').ok_or_else(invalid)?;
        let quota: u32 = quota.trim().parse().map_err(|_| invalid())?;
        let secs = match unit.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 3_600,
            Some('d') => 86_400,
            _ => return Err(invalid()),
        };
        Ok(Self::new(quota, Duration::from_secs(secs)))
    }
}

// == Rate Limiter ==
pub struct RateLimiter {
    rate: Rate,
    /// `None` for a zero quota
    keyed: Option<KeyedLimiter>,
}

impl RateLimiter {
    pub fn new(rate: Rate) -> Self {
        Self {
            rate,
            keyed: rate.to_quota().map(KeyedLimiter::keyed),
        }
    }

    /// Counts an attempt for `identity` and reports whether it is admitted.
    pub fn allow(&self, identity: &str) -> bool {
        self.check(identity).is_ok()
    }

    /// Counts an attempt for `identity`.
    ///
    /// Fails with `ChatError::RateLimitExceeded`, carrying the whole seconds
    /// until the next attempt would be admitted.
    pub fn check(&self, identity: &str) -> Result<()> {
        let Some(keyed) = &self.keyed else {
            return Err(self.reject(identity, self.rate.period));
        };

        match keyed.check_key(&identity.to_string()) {
            Ok(()) => {
                debug!("Rate limit attempt admitted for {}", identity);
                Ok(())
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(self.reject(identity, wait))
            }
        }
    }

    /// Forgets identities whose state is back to fresh; returns how many
    /// were dropped.
    pub fn prune(&self) -> usize {
        let Some(keyed) = &self.keyed else {
            return 0;
        };
        let before = keyed.len();
        keyed.retain_recent();
        keyed.shrink_to_fit();
        before.saturating_sub(keyed.len())
    }

    pub fn tracked(&self) -> usize {
        self.keyed.as_ref().map_or(0, |keyed| keyed.len())
    }

    fn reject(&self, identity: &str, wait: Duration) -> ChatError {
        // Round up so clients never retry early
        let retry_after_secs = (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1);
        warn!(
            "Rate limit exceeded for {} (retry allowed after {}s)",
            identity, retry_after_secs
        );
        ChatError::RateLimitExceeded { retry_after_secs }
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("tracked", &self.tracked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn retry_after(result: Result<()>) -> u64 {
        match result {
            Err(ChatError::RateLimitExceeded { retry_after_secs }) => retry_after_secs,
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!("1/day".parse::<Rate>().unwrap(), Rate::per_day(1));
        assert_eq!(
            "10/minute".parse::<Rate>().unwrap(),
            Rate::new(10, Duration::from_secs(60))
        );
        assert_eq!(
            " 5 / h ".parse::<Rate>().unwrap(),
            Rate::new(5, Duration::from_secs(3600))
        );
        assert_eq!(
            "3/s".parse::<Rate>().unwrap(),
            Rate::new(3, Duration::from_secs(1))
        );
    }

    #[test]
    fn test_parse_rate_invalid() {
        for raw in ["", "day", "x/day", "1/week", "-1/day", "1/"] {
            assert!(raw.parse::<Rate>().is_err(), "{raw} parsed");
        }
    }

    #[test]
    fn test_quota_then_reject() {
        let limiter = RateLimiter::new(Rate::new(3, Duration::from_secs(60)));

        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));

        // One attempt is regained every 20s
        let secs = retry_after(limiter.check("10.0.0.1"));
        assert!((19..=20).contains(&secs), "retry after {secs}s");
    }

    #[test]
    fn test_default_rate_is_once_per_day() {
        let limiter = RateLimiter::new(Rate::default());

        assert!(limiter.allow("10.0.0.1"));
        let secs = retry_after(limiter.check("10.0.0.1"));
        assert!(secs > 86_000 && secs <= 86_400, "retry after {secs}s");
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = RateLimiter::new(Rate::per_day(1));

        assert!(limiter.allow("alice"));
        assert!(!limiter.allow("alice"));
        assert!(limiter.allow("bob"));
    }

    #[test]
    fn test_attempt_regained_after_period() {
        let limiter = RateLimiter::new(Rate::new(1, Duration::from_millis(300)));

        assert!(limiter.allow("alice"));
        assert_eq!(retry_after(limiter.check("alice")), 1);

        sleep(Duration::from_millis(400));
        assert!(limiter.allow("alice"));
    }

    #[test]
    fn test_zero_quota_rejects_everything() {
        let limiter = RateLimiter::new(Rate::per_day(0));

        assert_eq!(retry_after(limiter.check("alice")), 86_400);
        assert_eq!(limiter.tracked(), 0);
    }

    #[test]
    fn test_prune_drops_recovered_identities() {
        let limiter = RateLimiter::new(Rate::new(1, Duration::from_millis(400)));
        limiter.allow("alice");
        sleep(Duration::from_millis(250));
        limiter.allow("bob");
        sleep(Duration::from_millis(250));

        assert_eq!(limiter.tracked(), 2);
        assert_eq!(limiter.prune(), 1);
        assert_eq!(limiter.tracked(), 1);
        assert!(!limiter.allow("bob"));
    }
}
