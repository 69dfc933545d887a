//! Repository for the `reactions` table.

use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::reaction::Reaction;

/// Column list for `reactions` queries.
const COLUMNS: &str = "id, goal_id, user_id, reaction_type, created_at";

pub struct ReactionRepo;

impl ReactionRepo {
    pub async fn find(
        pool: &PgPool,
        goal_id: DbId,
        user_id: DbId,
        reaction_type: &str,
    ) -> Result<Option<Reaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reactions \
             WHERE goal_id = $1 AND user_id = $2 AND reaction_type = $3"
        );
        sqlx::query_as::<_, Reaction>(&query)
            .bind(goal_id)
            .bind(user_id)
            .bind(reaction_type)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        goal_id: DbId,
        user_id: DbId,
        reaction_type: &str,
    ) -> Result<Reaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO reactions (id, goal_id, user_id, reaction_type) VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reaction>(&query)
            .bind(new_id())
            .bind(goal_id)
            .bind(user_id)
            .bind(reaction_type)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reactions on a goal, oldest first.
    pub async fn list_by_goal(pool: &PgPool, goal_id: DbId) -> Result<Vec<Reaction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM reactions WHERE goal_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, Reaction>(&query)
            .bind(goal_id)
            .fetch_all(pool)
            .await
    }
}
