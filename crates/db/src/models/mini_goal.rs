//! Mini-goal definitions and their per-member overlays.

use bingoals_core::types::{new_id, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// MiniGoal
// ---------------------------------------------------------------------------

/// A row from the `mini_goals` table. `is_complete` is only meaningful on
/// personal boards.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGoal {
    pub id: DbId,
    pub goal_id: DbId,
    pub title: String,
    pub percentage: i32,
    pub is_complete: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MiniGoal {
    pub fn new(goal_id: DbId, title: String, percentage: i32, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            goal_id,
            title,
            percentage,
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// MiniGoalMember
// ---------------------------------------------------------------------------

/// A row from the `mini_goal_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGoalMember {
    pub id: DbId,
    pub mini_goal_id: DbId,
    pub user_id: DbId,
    pub is_complete: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MiniGoalMember {
    pub fn new(mini_goal_id: DbId, user_id: DbId, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            mini_goal_id,
            user_id,
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }
}
