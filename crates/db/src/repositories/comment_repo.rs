//! Repository for the `comments` table.

use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::comment::Comment;

/// Column list for `comments` queries.
const COLUMNS: &str = "id, goal_id, user_id, text, created_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(
        pool: &PgPool,
        goal_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (id, goal_id, user_id, text) VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(new_id())
            .bind(goal_id)
            .bind(user_id)
            .bind(text)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on a goal, oldest first.
    pub async fn list_by_goal(pool: &PgPool, goal_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM comments WHERE goal_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, Comment>(&query)
            .bind(goal_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
