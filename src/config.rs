//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use ipnetwork::IpNetwork;
use tracing::warn;

use crate::models::DEFAULT_TIMEOUT_SECS;
use crate::rate_limit::Rate;
use crate::service::{DEFAULT_CACHE_TIMEOUT, DEFAULT_STORE_TIMEOUT};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Timeout in seconds for messages created without one
    pub default_timeout: u64,
    /// Message creation quota per identity
    pub throttle_rate: Rate,
    /// Maximum number of projections the cache can hold
    pub cache_max_entries: usize,
    /// Bound on each cache call
    pub cache_op_timeout: Duration,
    /// Bound on each durable store call
    pub store_op_timeout: Duration,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Peers whose `X-Forwarded-For` header is believed
    pub trusted_proxies: Vec<IpNetwork>,
}

/// Private ranges and loopback, where a reverse proxy usually sits
const DEFAULT_TRUSTED_PROXIES: &str = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32";

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TIMEOUT` - Default message timeout in seconds (default: 60)
    /// - `CHAT_THROTTLE_RATE` - Creation rate as `N/unit` (default: `1/day`)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity (default: 10000)
    /// - `CACHE_OP_TIMEOUT_MS` - Cache call bound (default: 250)
    /// - `STORE_OP_TIMEOUT_MS` - Durable store call bound (default: 2000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `TRUSTED_PROXIES` - Comma-separated CIDRs allowed to set
    ///   `X-Forwarded-For` (default: private ranges and loopback; empty trusts none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            default_timeout: env_or("DEFAULT_TIMEOUT", defaults.default_timeout),
            throttle_rate: env_or("CHAT_THROTTLE_RATE", defaults.throttle_rate),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_op_timeout: Duration::from_millis(env_or(
                "CACHE_OP_TIMEOUT_MS",
                defaults.cache_op_timeout.as_millis() as u64,
            )),
            store_op_timeout: Duration::from_millis(env_or(
                "STORE_OP_TIMEOUT_MS",
                defaults.store_op_timeout.as_millis() as u64,
            )),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval).max(1),
            trusted_proxies: match env::var("TRUSTED_PROXIES") {
                Ok(raw) => parse_networks(&raw).unwrap_or_else(|err| {
                    warn!("Ignoring TRUSTED_PROXIES={:?} ({}), using default", raw, err);
                    defaults.trusted_proxies
                }),
                Err(_) => defaults.trusted_proxies,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_timeout: DEFAULT_TIMEOUT_SECS,
            throttle_rate: Rate::default(),
            cache_max_entries: 10_000,
            cache_op_timeout: DEFAULT_CACHE_TIMEOUT,
            store_op_timeout: DEFAULT_STORE_TIMEOUT,
            cleanup_interval: 1,
            trusted_proxies: parse_networks(DEFAULT_TRUSTED_PROXIES).unwrap_or_default(),
        }
    }
}

/// Reads and parses `key`, keeping `default` when unset or unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Parses a comma-separated CIDR list. Blank input yields an empty list.
fn parse_networks(raw: &str) -> Result<Vec<IpNetwork>, ipnetwork::IpNetworkError> {
    raw.split(',')
        .map(str::trim)
        .filter(|net| !net.is_empty())
        .map(str::parse)
        .collect()
}
