use bingoals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DbId,
    pub goal_id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub created_at: Timestamp,
}
