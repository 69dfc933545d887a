//! Repository for the `goals` table.

use std::collections::HashSet;

use bingoals_core::types::DbId;
use sqlx::PgPool;

use crate::models::goal::Goal;

/// Column list for `goals` queries.
const COLUMNS: &str = "id, board_id, position, title, description, icon, image_url, mood, \
                       status, is_completed, progress, completed_by, completed_at, \
                       created_at, updated_at";

/// Provides CRUD operations for goals.
pub struct GoalRepo;

impl GoalRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goals WHERE id = $1");
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_position(
        pool: &PgPool,
        board_id: DbId,
        position: i32,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goals WHERE board_id = $1 AND position = $2");
        sqlx::query_as::<_, Goal>(&query)
            .bind(board_id)
            .bind(position)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_board(pool: &PgPool, board_id: DbId) -> Result<Vec<Goal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goals WHERE board_id = $1 ORDER BY position");
        sqlx::query_as::<_, Goal>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or overwrite a goal by id. Two writers lazily creating the same
    /// position collide on `uq_goals_board_position`.
    pub async fn upsert(pool: &PgPool, goal: &Goal) -> Result<Goal, sqlx::Error> {
        let query = format!(
            "INSERT INTO goals (id, board_id, position, title, description, icon, image_url, mood, \
                status, is_completed, progress, completed_by, completed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                icon = EXCLUDED.icon, \
                image_url = EXCLUDED.image_url, \
                mood = EXCLUDED.mood, \
                status = EXCLUDED.status, \
                is_completed = EXCLUDED.is_completed, \
                progress = EXCLUDED.progress, \
                completed_by = EXCLUDED.completed_by, \
                completed_at = EXCLUDED.completed_at, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(goal.id)
            .bind(goal.board_id)
            .bind(goal.position)
            .bind(&goal.title)
            .bind(&goal.description)
            .bind(&goal.icon)
            .bind(&goal.image_url)
            .bind(&goal.mood)
            .bind(&goal.status)
            .bind(goal.is_completed)
            .bind(goal.progress)
            .bind(goal.completed_by)
            .bind(goal.completed_at)
            .bind(goal.created_at)
            .bind(goal.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Save an already-reset goal and delete everything hanging off it:
    /// mini-goals (and through them their overlays), goal overlays and the
    /// reflection. One transaction.
    pub async fn clear(pool: &PgPool, reset: &Goal) -> Result<Goal, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let minis = sqlx::query("DELETE FROM mini_goals WHERE goal_id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;
        let overlays = sqlx::query("DELETE FROM goal_members WHERE goal_id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reflections WHERE goal_id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE goals SET title = NULL, description = NULL, icon = NULL, image_url = NULL, \
                mood = NULL, status = $2, is_completed = false, progress = 0, \
                completed_by = NULL, completed_at = NULL, updated_at = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let goal = sqlx::query_as::<_, Goal>(&query)
            .bind(reset.id)
            .bind(&reset.status)
            .bind(reset.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            goal_id = %goal.id,
            mini_goals = minis.rows_affected(),
            overlays = overlays.rows_affected(),
            "Goal cleared with dependents"
        );
        Ok(goal)
    }

    /// Positions whose canonical status is completed.
    pub async fn completed_positions(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<HashSet<i32>, sqlx::Error> {
        let rows: Vec<i32> = sqlx::query_scalar(
            "SELECT position FROM goals WHERE board_id = $1 AND is_completed = true",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Positions that `user_id` has completed through their own overlay rows.
    pub async fn member_completed_positions(
        pool: &PgPool,
        board_id: DbId,
        user_id: DbId,
    ) -> Result<HashSet<i32>, sqlx::Error> {
        let rows: Vec<i32> = sqlx::query_scalar(
            "SELECT g.position FROM goals g \
             JOIN goal_members gm ON gm.goal_id = g.id \
             WHERE g.board_id = $1 AND gm.user_id = $2 AND gm.is_completed = true",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
