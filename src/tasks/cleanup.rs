//! Expiry Sweep Task
//!
//! Reads already ignore expired entries; this sweep keeps keys nobody asks
//! for again from lingering in memory and in `/api/cache/stats`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that calls [`CacheStore::cleanup_expired`] every
/// `interval_secs` seconds until aborted.
///
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_cleanup_task(cache: Arc<RwLock<CacheStore>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "cache expiry sweep started");

        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!(removed, "cache expiry sweep removed entries");
            } else {
                debug!("cache expiry sweep found nothing to remove");
            }
        }
    })
}
