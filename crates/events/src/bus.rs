//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application. The
//! collaboration engine publishes to it; [`NotificationFanout`] consumes it.
//!
//! [`NotificationFanout`]: crate::fanout::NotificationFanout

use bingoals_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::notify::Notice;

/// Dot-separated event names.
pub mod event_types {
    pub const GOAL_COMPLETED: &str = "goal.completed";
    pub const MEMBER_JOINED: &str = "member.joined";
    pub const MEMBER_LEFT: &str = "member.left";
    pub const COMMENT_ADDED: &str = "comment.added";
    pub const REACTION_ADDED: &str = "reaction.added";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on a board.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"goal.completed"`.
    pub event_type: String,

    /// Board the event happened on.
    pub board_id: Option<DbId>,

    /// User that triggered the event. Never notified about it.
    pub actor_user_id: Option<DbId>,

    /// Explicit audience for the notice. `None` means every board member.
    pub recipients: Option<Vec<DbId>>,

    /// Message for the audience, if the event warrants one.
    pub notice: Option<Notice>,

    pub timestamp: Timestamp,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            board_id: None,
            actor_user_id: None,
            recipients: None,
            notice: None,
            timestamp: Utc::now(),
        }
    }

    pub fn on_board(mut self, board_id: DbId) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Address the notice to these users instead of the board members.
    pub fn to_recipients(mut self, recipients: Vec<DbId>) -> Self {
        self.recipients = Some(recipients);
        self
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped silently when
    /// nobody is subscribed.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
