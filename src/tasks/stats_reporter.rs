//! Stats Reporter Task
//!
//! Background task that periodically logs cache occupancy and hit rate.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::NWaySetAssociativeCache;

/// Spawns a background task that logs a summary of the cache every
/// `interval_secs` seconds.
///
/// Each report walks every set's shared lock once, so it never blocks
/// writers for longer than a single set scan.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(NWaySetAssociativeCache::<String, String>::new(256, 8)?);
/// let report_handle = spawn_stats_task(cache.clone(), 30);
/// // Later, during shutdown:
/// report_handle.abort();
/// ```
pub fn spawn_stats_task<K, V, S>(
    cache: Arc<NWaySetAssociativeCache<K, V, S>>,
    interval_secs: u64,
) -> JoinHandle<()>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;
            report(&*cache);
        }
    })
}

/// Logs one occupancy summary and returns the fullest set's live count.
fn report<K, V, S>(cache: &NWaySetAssociativeCache<K, V, S>) -> usize {
    let stats = cache.stats();
    let fullest = cache.set_occupancy().into_iter().max().unwrap_or(0);

    if stats.total_entries == 0 {
        debug!("Stats report: cache is empty");
    } else {
        info!(
            entries = stats.total_entries,
            capacity = stats.capacity,
            hit_rate = stats.hit_rate(),
            evictions = stats.evictions,
            fullest_set = fullest,
            set_size = cache.set_size(),
            "Stats report"
        );
    }
    fullest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_returns_fullest_set() {
        let cache = NWaySetAssociativeCache::<u32, u32>::new(4, 4).unwrap();
        assert_eq!(report(&cache), 0);

        for key in 0..6 {
            cache.insert(key, key);
        }
        let fullest = cache.set_occupancy().into_iter().max().unwrap();
        assert_eq!(report(&cache), fullest);
    }

    #[tokio::test]
    async fn test_stats_task_keeps_running() {
        let cache = Arc::new(NWaySetAssociativeCache::<String, String>::new(2, 2).unwrap());
        cache.insert("key".to_string(), "value".to_string());

        let handle = spawn_stats_task(cache.clone(), 1);

        // Let at least one report run
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(!handle.is_finished(), "Reporter should still be running");

        // Reporting only reads, so the entry is untouched
        assert!(cache.contains_key("key"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_stats_task_can_be_aborted() {
        let cache = Arc::new(NWaySetAssociativeCache::<u32, u32>::new(1, 1).unwrap());

        let handle = spawn_stats_task(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
