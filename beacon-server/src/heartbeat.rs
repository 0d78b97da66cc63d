use crate::registry::ConnectionRegistry;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Periodic liveness sweep over the connection registry. Runs for the life of
/// the process; each pass probes responsive connections and terminates the
/// ones that missed the previous probe.
pub async fn run_heartbeat(registry: ConnectionRegistry, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        debug!("Liveness sweep over {} connections", registry.len());
        registry.sweep();
    }
}
