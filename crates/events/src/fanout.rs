//! Notification fan-out service.
//!
//! [`NotificationFanout`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and, for every event carrying a [`Notice`](crate::notify::Notice), writes
//! one notification per recipient other than the actor and forwards it to
//! the configured sink. Recipients are the event's explicit list when it has
//! one, otherwise every member of the event's board. It runs as a long-lived background task; nothing
//! on the request path waits for it.

use std::sync::Arc;

use bingoals_core::types::DbId;
use bingoals_db::models::NewNotification;
use bingoals_db::{ProgressStore, StoreResult};
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::notify::NotificationSink;

pub struct NotificationFanout {
    store: Arc<dyn ProgressStore>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationFanout {
    pub fn new(store: Arc<dyn ProgressStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Run the fan-out loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to fan out notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification fan-out lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification fan-out shutting down");
                    break;
                }
            }
        }
    }

    /// Notify the audience of one event. Returns the number of
    /// notifications written.
    ///
    /// A failed sink delivery is logged and does not stop the remaining
    /// recipients.
    pub async fn handle(&self, event: &PlatformEvent) -> StoreResult<usize> {
        let (Some(notice), Some(board_id)) = (&event.notice, event.board_id) else {
            return Ok(0);
        };

        let mut audience: Vec<DbId> = match &event.recipients {
            Some(explicit) => explicit.clone(),
            None => self
                .store
                .list_board_members(board_id)
                .await?
                .into_iter()
                .map(|m| m.user_id)
                .collect(),
        };
        audience.retain(|user_id| Some(*user_id) != event.actor_user_id);
        audience.sort();
        audience.dedup();

        let mut written = 0;
        for user_id in audience {
            let notification = self
                .store
                .create_notification(NewNotification {
                    user_id,
                    notification_type: notice.kind.clone(),
                    title: notice.title.clone(),
                    body: notice.body.clone(),
                    metadata: notice.metadata.clone(),
                })
                .await?;
            written += 1;

            if let Err(e) = self.sink.deliver(&notification).await {
                tracing::error!(
                    error = %e,
                    user_id = %user_id,
                    "Notification sink delivery failed"
                );
            }
        }

        tracing::debug!(
            board_id = %board_id,
            event_type = %event.event_type,
            recipients = written,
            "Notifications fanned out"
        );
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
