use bingoals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reactions` table. One per (goal, user, kind).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: DbId,
    pub goal_id: DbId,
    pub user_id: DbId,
    pub reaction_type: String,
    pub created_at: Timestamp,
}
