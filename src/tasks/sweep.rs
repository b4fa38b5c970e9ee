//! Sweep Tasks
//!
//! Background tasks that periodically sweep the response cache and the
//! rate windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::cache::SharedCache;
use crate::rate::RateTracker;

/// Spawns a background task that sweeps the cache every `period`.
///
/// Each sweep holds the cache write lock for its whole duration. The first
/// sweep happens one full period after spawning.
///
/// # Arguments
/// * `cache` - Shared handle to the response cache
/// * `period` - Time between sweeps. A zero period is logged as an error
///   and the task ends without sweeping.
/// * `shutdown_rx` - Stops the task when it turns `true` or its sender drops
///
/// # Returns
/// A JoinHandle that completes once the task has observed shutdown.
pub fn spawn_cache_sweep(
    cache: SharedCache,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if period.is_zero() {
            error!("Cache sweep period is zero, not starting cache sweep task");
            return;
        }
        info!(period_secs = period.as_secs_f64(), "Starting cache sweep task");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = cache.write().await.sweep();
                    debug!(
                        evicted = report.evicted(),
                        remaining = report.remaining_entries,
                        "Cache sweep finished"
                    );
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Cache sweep task shutting down");
                        break;
                    }
                }
            }
        }
    })
}

/// Spawns a background task that trims every rate window each `period`.
///
/// # Arguments
/// * `tracker` - Shared rate tracker
/// * `period` - Time between sweeps. A zero period is logged as an error
///   and the task ends without sweeping.
/// * `shutdown_rx` - Stops the task when it turns `true` or its sender drops
pub fn spawn_rate_sweep(
    tracker: Arc<RateTracker>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if period.is_zero() {
            error!("Rate sweep period is zero, not starting rate sweep task");
            return;
        }
        info!(period_ms = period.as_millis() as u64, "Starting rate sweep task");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = tracker.sweep().await;
                    if removed > 0 {
                        debug!(removed, "Rate sweep trimmed expired events");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Rate sweep task shutting down");
                        break;
                    }
                }
            }
        }
    })
}
