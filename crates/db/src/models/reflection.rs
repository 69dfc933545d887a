//! Goal reflection model.

use bingoals_core::types::{new_id, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reflections` table. At most one per goal.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: DbId,
    pub goal_id: DbId,
    pub obstacles: Option<String>,
    pub victories: Option<String>,
    pub notes: Option<String>,
    pub reflection_prompt: Option<String>,
    pub reflection_answer: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reflection {
    /// Fresh reflection with only a prompt filled in.
    pub fn blank(goal_id: DbId, prompt: &str, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            goal_id,
            obstacles: None,
            victories: None,
            notes: None,
            reflection_prompt: Some(prompt.to_string()),
            reflection_answer: None,
            created_at: now,
            updated_at: now,
        }
    }
}
