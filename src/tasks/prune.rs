//! Rate Limit Window Pruning Task
//!
//! Background task that periodically drops elapsed rate limit windows so the
//! per-identity table does not grow with every key ever presented.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::guard::RateLimiter;

/// Spawns a background task that prunes elapsed rate limit windows.
///
/// Pruning is not needed for correctness: an elapsed window is reset on the
/// next request from its identity anyway.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_prune_task(limiter: Arc<RateLimiter>, prune_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(prune_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting rate limit pruning task with interval of {} seconds",
            prune_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = limiter.prune_expired(Instant::now());

            if removed > 0 {
                info!("Rate limit pruning: removed {} elapsed windows", removed);
            } else {
                debug!("Rate limit pruning: no elapsed windows found");
            }
        }
    })
}
