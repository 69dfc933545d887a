//! Realtime wire protocol for board rooms.
//!
//! Every server-to-client message is a JSON object
//! `{"type", "boardId", "userId", "data"?}`. `data` is type-specific and
//! opaque to the hub that delivers it.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Discriminator of a [`BoardEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEventType {
    MemberJoined,
    MemberLeft,
    GoalUpdated,
    GoalCompleted,
    CommentAdded,
    CommentDeleted,
}

impl BoardEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MemberJoined => "member_joined",
            Self::MemberLeft => "member_left",
            Self::GoalUpdated => "goal_updated",
            Self::GoalCompleted => "goal_completed",
            Self::CommentAdded => "comment_added",
            Self::CommentDeleted => "comment_deleted",
        }
    }
}

/// A state change on a board, fanned out to the board's room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEvent {
    #[serde(rename = "type")]
    pub event_type: BoardEventType,
    pub board_id: DbId,
    /// The user the event is about. Usually the actor; for `member_left`
    /// it is the member who was removed.
    pub user_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl BoardEvent {
    pub fn new(event_type: BoardEventType, board_id: DbId, user_id: DbId) -> Self {
        Self {
            event_type,
            board_id,
            user_id,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_shape() {
        let board = uuid::Uuid::nil();
        let user = uuid::Uuid::from_u128(7);
        let event = BoardEvent::new(BoardEventType::GoalCompleted, board, user)
            .with_data(serde_json::json!({ "position": 4 }));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "goal_completed");
        assert_eq!(json["boardId"], board.to_string());
        assert_eq!(json["userId"], user.to_string());
        assert_eq!(json["data"]["position"], 4);
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let event = BoardEvent::new(
            BoardEventType::MemberLeft,
            uuid::Uuid::nil(),
            uuid::Uuid::nil(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn type_names_match_serde() {
        for t in [
            BoardEventType::MemberJoined,
            BoardEventType::MemberLeft,
            BoardEventType::GoalUpdated,
            BoardEventType::GoalCompleted,
            BoardEventType::CommentAdded,
            BoardEventType::CommentDeleted,
        ] {
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
    }
}
