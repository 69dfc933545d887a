use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::ws::hub::BoardHub;

/// Spawn a background task that pings every room connection on a fixed
/// interval until `cancel` fires.
pub fn start_heartbeat(
    hub: Arc<BoardHub>,
    interval_secs: u64,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Heartbeat stopped");
                    break;
                }
                _ = interval.tick() => {
                    let count = hub.connection_count().await;
                    tracing::debug!(count, "WebSocket heartbeat ping");
                    hub.ping_all().await;
                }
            }
        }
    })
}
