//! Expiry Sweep Task
//!
//! Background task that periodically purges expired entries, so storage
//! does not hold on to responses nobody requests again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{sweep_expired, Clock};
use crate::storage::SharedStorage;

/// Spawns a background task that periodically purges expired entries from `storage`.
///
/// Only storages that enumerate their keys can be swept; for others each
/// run is a no-op.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(storage.clone(), Arc::new(SystemClock), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(
    storage: SharedStorage,
    clock: Arc<dyn Clock>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = sweep_expired(storage.as_ref(), clock.now_ms());

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
