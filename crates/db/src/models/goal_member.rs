//! Per-member goal overlay model.

use bingoals_core::status::{GoalStatus, ProgressState};
use bingoals_core::types::{new_id, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `goal_members` table: one member's completion state for
/// one goal on a shared board.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMember {
    pub id: DbId,
    pub goal_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub is_completed: bool,
    pub progress: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GoalMember {
    /// The not-started overlay used when no row exists yet.
    pub fn new(goal_id: DbId, user_id: DbId, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            goal_id,
            user_id,
            status: GoalStatus::NotStarted.as_str().to_string(),
            is_completed: false,
            progress: 0,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> ProgressState {
        ProgressState {
            status: GoalStatus::parse_lenient(&self.status),
            progress: self.progress,
            completed_at: self.completed_at,
        }
    }

    pub fn apply_state(&mut self, state: ProgressState, now: Timestamp) {
        self.status = state.status.as_str().to_string();
        self.is_completed = state.is_completed();
        self.progress = state.progress;
        self.completed_at = state.completed_at;
        self.updated_at = now;
    }
}
