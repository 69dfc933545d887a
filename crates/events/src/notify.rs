//! Notice content and the delivery seam for notifications.

use async_trait::async_trait;
use bingoals_db::models::Notification;
use serde::{Deserialize, Serialize};

/// What board members are told about an event. Turned into one
/// [`Notification`] row per recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Stored as `notifications.notification_type`.
    pub kind: String,
    pub title: String,
    pub body: String,
    pub metadata: Option<serde_json::Value>,
}

impl Notice {
    pub fn new(kind: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            body: body.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Outbound channel for persisted notifications (push, email, ...).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError>;
}

/// Sink that only logs. Used when no push channel is configured.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        tracing::debug!(
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            title = %notification.title,
            "Notification delivered"
        );
        Ok(())
    }
}
