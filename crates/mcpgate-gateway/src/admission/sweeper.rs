//! Background eviction of idle tenant budgets.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::clock::Clock;
use super::registry::AdmissionRegistry;

/// Periodically evict budgets idle for at least `ttl`.
///
/// The returned handle runs until aborted or the runtime shuts down.
pub fn spawn_sweeper(
    registry: Arc<AdmissionRegistry>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing can be idle yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = registry.evict_idle(clock.now(), ttl);
            if removed > 0 {
                tracing::info!(removed, tracked = registry.len(), "admission sweeper pass");
            }
        }
    })
}
