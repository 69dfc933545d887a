//! Goal model: one cell of a board.

use bingoals_core::status::{GoalStatus, ProgressState};
use bingoals_core::types::{new_id, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `goals` table.
///
/// On personal boards the completion fields are the truth. On shared boards
/// they stay at their defaults and per-member state lives in `goal_members`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: DbId,
    pub board_id: DbId,
    pub position: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
    pub status: String,
    pub is_completed: bool,
    pub progress: i32,
    pub completed_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Goal {
    /// An empty goal for a position that has never been written.
    pub fn blank(board_id: DbId, position: i32, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            board_id,
            position,
            title: None,
            description: None,
            icon: None,
            image_url: None,
            mood: None,
            status: GoalStatus::NotStarted.as_str().to_string(),
            is_completed: false,
            progress: 0,
            completed_by: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Canonical completion state.
    pub fn state(&self) -> ProgressState {
        ProgressState {
            status: GoalStatus::parse_lenient(&self.status),
            progress: self.progress,
            completed_at: self.completed_at,
        }
    }

    /// Write a new canonical state. `completed_by` is kept only while the
    /// goal stays completed.
    pub fn apply_state(&mut self, state: ProgressState, actor: DbId, now: Timestamp) {
        self.status = state.status.as_str().to_string();
        self.is_completed = state.is_completed();
        self.progress = state.progress;
        self.completed_at = state.completed_at;
        self.completed_by = state.is_completed().then_some(actor);
        self.updated_at = now;
    }

    /// Reset content and completion fields, keeping identity and position.
    pub fn cleared(&self, now: Timestamp) -> Self {
        Self {
            id: self.id,
            created_at: self.created_at,
            ..Self::blank(self.board_id, self.position, now)
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}
