//! Repository for the `reflections` table.

use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::reflection::Reflection;

/// Column list for `reflections` queries.
const COLUMNS: &str = "id, goal_id, obstacles, victories, notes, reflection_prompt, \
                       reflection_answer, created_at, updated_at";

pub struct ReflectionRepo;

impl ReflectionRepo {
    pub async fn find_by_goal(
        pool: &PgPool,
        goal_id: DbId,
    ) -> Result<Option<Reflection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reflections WHERE goal_id = $1");
        sqlx::query_as::<_, Reflection>(&query)
            .bind(goal_id)
            .fetch_optional(pool)
            .await
    }

    /// Create an empty reflection carrying `prompt` unless one exists.
    /// Returns `true` when a row was inserted.
    pub async fn create_blank(pool: &PgPool, goal_id: DbId, prompt: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO reflections (id, goal_id, reflection_prompt) VALUES ($1, $2, $3) \
             ON CONFLICT (goal_id) DO NOTHING",
        )
        .bind(new_id())
        .bind(goal_id)
        .bind(prompt)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or overwrite the goal's reflection, keyed by `goal_id`.
    pub async fn upsert(pool: &PgPool, reflection: &Reflection) -> Result<Reflection, sqlx::Error> {
        let query = format!(
            "INSERT INTO reflections (id, goal_id, obstacles, victories, notes, \
                reflection_prompt, reflection_answer) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (goal_id) DO UPDATE SET \
                obstacles = EXCLUDED.obstacles, \
                victories = EXCLUDED.victories, \
                notes = EXCLUDED.notes, \
                reflection_prompt = EXCLUDED.reflection_prompt, \
                reflection_answer = EXCLUDED.reflection_answer, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reflection>(&query)
            .bind(reflection.id)
            .bind(reflection.goal_id)
            .bind(&reflection.obstacles)
            .bind(&reflection.victories)
            .bind(&reflection.notes)
            .bind(&reflection.reflection_prompt)
            .bind(&reflection.reflection_answer)
            .fetch_one(pool)
            .await
    }
}
