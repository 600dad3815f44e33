//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries and, if
//! the store is still over capacity afterwards, evicts the entries with the
//! soonest expiry.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns the background maintenance task for the shared cache.
///
/// The returned handle is owned by the process bootstrap and aborted during
/// graceful shutdown; the cache itself never starts its own timers, so tests
/// can construct isolated instances without background activity.
pub fn spawn_sweep_task(cache: Cache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting cache sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let (expired, evicted) = cache.sweep().await;

            if expired > 0 || evicted > 0 {
                info!(expired, evicted, "cache sweep completed");
            } else {
                debug!("cache sweep: nothing to remove");
            }

            let stats = cache.stats().await;
            debug!(
                size = stats.total_entries,
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                "cache stats"
            );
        }
    })
}
