//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries and
//! re-checks memory pressure.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::{Clock, TtlCache};
use crate::error::{CacheError, Result};

/// Spawns a background task that runs [`TtlCache::run_maintenance`] every
/// `interval`.
///
/// The task only holds a weak reference, so it ends on its own once the
/// last owner drops the cache; [`TtlCache::dispose`] aborts it earlier.
/// Failures in a cycle are logged and the next cycle runs as scheduled.
///
/// # Errors
/// Returns [`CacheError::NoRuntime`] when called outside a tokio runtime.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(TtlCache::new(config)?);
/// let handle = spawn_cleanup_task(Arc::downgrade(&cache), Duration::from_secs(60))?;
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<K, V, C>(
    cache: Weak<TtlCache<K, V, C>>,
    interval: Duration,
) -> Result<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    C: Clock,
{
    let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

    Ok(runtime.spawn(async move {
        info!("Starting cache cleanup task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(cache) = cache.upgrade() else {
                debug!("Cache dropped, stopping cleanup task");
                break;
            };

            match cache.run_maintenance() {
                Ok(report) if report.expired > 0 || report.evicted > 0 => {
                    info!(
                        "Cache cleanup: removed {} expired entries, evicted {} ({:?} pressure)",
                        report.expired, report.evicted, report.pressure
                    );
                }
                Ok(report) => {
                    debug!(
                        "Cache cleanup: no expired entries found ({:?} pressure)",
                        report.pressure
                    );
                }
                Err(e) => {
                    warn!("Cache cleanup cycle failed: {}", e);
                }
            }
        }
    }))
}
