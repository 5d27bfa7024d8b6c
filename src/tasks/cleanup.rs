//! Expiry Sweeper
//!
//! Background task that periodically drops expired cache entries and
//! rate-limit state for identities that have fully recovered. Reads never depend on it; it only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;
use crate::rate_limit::RateLimiter;

/// Spawns the sweeper, running every `cleanup_interval_secs` seconds.
///
/// Returns the task handle so shutdown can abort it.
pub fn spawn_cleanup_task(
    cache: Arc<MemoryCache>,
    limiter: Arc<RateLimiter>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            let identities = limiter.prune();

            if removed > 0 || identities > 0 {
                info!(
                    "Sweep: removed {} expired cache entries, {} idle rate-limit identities",
                    removed, identities
                );
            } else {
                debug!("Sweep: nothing to remove");
            }
        }
    })
}
