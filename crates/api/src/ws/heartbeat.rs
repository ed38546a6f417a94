use std::sync::Arc;
use std::time::Duration;

use crate::ws::streams::StreamRegistry;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every stream subscriber so idle
/// connections survive long generations behind proxies.
pub fn start_heartbeat(streams: Arc<StreamRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = streams.stream_count().await;
            tracing::debug!(count, "Stream heartbeat ping");
            streams.ping_all().await;
        }
    })
}
