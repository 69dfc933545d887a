//! Repository for the `goal_members` overlay table.

use std::collections::HashMap;

use bingoals_core::types::DbId;
use sqlx::PgPool;

use crate::models::goal_member::GoalMember;

/// Column list for `goal_members` queries.
const COLUMNS: &str = "id, goal_id, user_id, status, is_completed, progress, completed_at, \
                       created_at, updated_at";

/// Provides lookups and upserts for per-member goal state.
pub struct GoalMemberRepo;

impl GoalMemberRepo {
    pub async fn find(
        pool: &PgPool,
        goal_id: DbId,
        user_id: DbId,
    ) -> Result<Option<GoalMember>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM goal_members WHERE goal_id = $1 AND user_id = $2");
        sqlx::query_as::<_, GoalMember>(&query)
            .bind(goal_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One user's overlays for a batch of goals, in a single query.
    pub async fn list_for_user(
        pool: &PgPool,
        goal_ids: &[DbId],
        user_id: DbId,
    ) -> Result<Vec<GoalMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM goal_members WHERE goal_id = ANY($1) AND user_id = $2"
        );
        sqlx::query_as::<_, GoalMember>(&query)
            .bind(goal_ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every member's overlay for one goal.
    pub async fn list_by_goal(pool: &PgPool, goal_id: DbId) -> Result<Vec<GoalMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goal_members WHERE goal_id = $1");
        sqlx::query_as::<_, GoalMember>(&query)
            .bind(goal_id)
            .fetch_all(pool)
            .await
    }

    /// Number of distinct users with a completed overlay, per goal. Goals
    /// nobody has completed are absent from the map.
    pub async fn completed_counts(
        pool: &PgPool,
        goal_ids: &[DbId],
    ) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let rows: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT goal_id, COUNT(DISTINCT user_id) FROM goal_members \
             WHERE goal_id = ANY($1) AND is_completed = true \
             GROUP BY goal_id",
        )
        .bind(goal_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Insert or overwrite the overlay for `(goal_id, user_id)`.
    pub async fn upsert(pool: &PgPool, member: &GoalMember) -> Result<GoalMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO goal_members (id, goal_id, user_id, status, is_completed, progress, \
                completed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (goal_id, user_id) DO UPDATE SET \
                status = EXCLUDED.status, \
                is_completed = EXCLUDED.is_completed, \
                progress = EXCLUDED.progress, \
                completed_at = EXCLUDED.completed_at, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GoalMember>(&query)
            .bind(member.id)
            .bind(member.goal_id)
            .bind(member.user_id)
            .bind(&member.status)
            .bind(member.is_completed)
            .bind(member.progress)
            .bind(member.completed_at)
            .bind(member.created_at)
            .bind(member.updated_at)
            .fetch_one(pool)
            .await
    }
}
