//! Board activity feed model.

use bingoals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Values of `activities.action_type`.
pub mod action_types {
    pub const GOAL_COMPLETED: &str = "goal_completed";
    pub const COMMENT_ADDED: &str = "comment_added";
    pub const MEMBER_JOINED: &str = "member_joined";
    pub const MEMBER_LEFT: &str = "member_left";
}

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: DbId,
    pub board_id: DbId,
    pub user_id: DbId,
    pub action_type: String,
    pub target_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for recording an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub board_id: DbId,
    pub user_id: DbId,
    pub action_type: &'static str,
    pub target_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}
