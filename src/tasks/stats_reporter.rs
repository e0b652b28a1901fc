//! Cache Statistics Reporter
//!
//! Background task that periodically logs cache counters.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{mutex_lock, SharedCache};

/// Spawns a background task that logs cache statistics every
/// `interval_secs` seconds.
///
/// Idle periods (no new hits or misses) are logged at debug level only.
/// The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::shared();
/// let reporter = spawn_stats_reporter(cache.clone(), 60);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache stats reporter with interval of {} seconds",
            interval_secs
        );

        let mut last_requests = 0;
        loop {
            tokio::time::sleep(interval).await;

            let stats = mutex_lock(&cache, "stats_report").stats();
            let requests = stats.hits + stats.misses;

            if requests > last_requests {
                info!(
                    hits = stats.hits,
                    misses = stats.misses,
                    invalidations = stats.invalidations,
                    entries = stats.total_entries,
                    hit_rate = stats.hit_rate(),
                    "Cache stats"
                );
            } else {
                debug!(entries = stats.total_entries, "Cache stats: no new requests");
            }
            last_requests = requests;
        }
    })
}
