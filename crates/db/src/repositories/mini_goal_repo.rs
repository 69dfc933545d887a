//! Repositories for the `mini_goals` and `mini_goal_members` tables.

use bingoals_core::types::DbId;
use sqlx::PgPool;

use crate::models::mini_goal::{MiniGoal, MiniGoalMember};

// ---------------------------------------------------------------------------
// MiniGoalRepo
// ---------------------------------------------------------------------------

/// Column list for `mini_goals` queries.
const MINI_COLUMNS: &str = "id, goal_id, title, percentage, is_complete, created_at, updated_at";

/// Provides CRUD operations for mini-goal definitions.
pub struct MiniGoalRepo;

impl MiniGoalRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MiniGoal>, sqlx::Error> {
        let query = format!("SELECT {MINI_COLUMNS} FROM mini_goals WHERE id = $1");
        sqlx::query_as::<_, MiniGoal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mini-goals of a batch of goals, oldest first within each goal.
    pub async fn list_by_goals(
        pool: &PgPool,
        goal_ids: &[DbId],
    ) -> Result<Vec<MiniGoal>, sqlx::Error> {
        let query = format!(
            "SELECT {MINI_COLUMNS} FROM mini_goals WHERE goal_id = ANY($1) \
             ORDER BY goal_id, created_at"
        );
        sqlx::query_as::<_, MiniGoal>(&query)
            .bind(goal_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn upsert(pool: &PgPool, mini: &MiniGoal) -> Result<MiniGoal, sqlx::Error> {
        let query = format!(
            "INSERT INTO mini_goals (id, goal_id, title, percentage, is_complete, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, \
                percentage = EXCLUDED.percentage, \
                is_complete = EXCLUDED.is_complete, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {MINI_COLUMNS}"
        );
        sqlx::query_as::<_, MiniGoal>(&query)
            .bind(mini.id)
            .bind(mini.goal_id)
            .bind(&mini.title)
            .bind(mini.percentage)
            .bind(mini.is_complete)
            .bind(mini.created_at)
            .bind(mini.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Delete a mini-goal. Its overlay rows cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mini_goals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// MiniGoalMemberRepo
// ---------------------------------------------------------------------------

/// Column list for `mini_goal_members` queries.
const MEMBER_COLUMNS: &str = "id, mini_goal_id, user_id, is_complete, created_at, updated_at";

/// Provides lookups and upserts for per-member mini-goal state.
pub struct MiniGoalMemberRepo;

impl MiniGoalMemberRepo {
    pub async fn list_for_user(
        pool: &PgPool,
        mini_goal_ids: &[DbId],
        user_id: DbId,
    ) -> Result<Vec<MiniGoalMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM mini_goal_members \
             WHERE mini_goal_id = ANY($1) AND user_id = $2"
        );
        sqlx::query_as::<_, MiniGoalMember>(&query)
            .bind(mini_goal_ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn upsert(
        pool: &PgPool,
        member: &MiniGoalMember,
    ) -> Result<MiniGoalMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO mini_goal_members (id, mini_goal_id, user_id, is_complete, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (mini_goal_id, user_id) DO UPDATE SET \
                is_complete = EXCLUDED.is_complete, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, MiniGoalMember>(&query)
            .bind(member.id)
            .bind(member.mini_goal_id)
            .bind(member.user_id)
            .bind(member.is_complete)
            .bind(member.created_at)
            .bind(member.updated_at)
            .fetch_one(pool)
            .await
    }
}
