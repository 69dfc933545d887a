//! Repository for the `activities` table.

use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::activity::{Activity, NewActivity};

/// Column list for `activities` queries.
const COLUMNS: &str = "id, board_id, user_id, action_type, target_id, metadata, created_at";

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &PgPool, input: &NewActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (id, board_id, user_id, action_type, target_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(new_id())
            .bind(input.board_id)
            .bind(input.user_id)
            .bind(input.action_type)
            .bind(input.target_id)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Most recent activity on a board first.
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: DbId,
        limit: i64,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities WHERE board_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(board_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
