//! Repository for the `users` table.

use bingoals_core::types::{Day, DbId};
use sqlx::PgPool;

use crate::models::user::{NewUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, name, display_name, total_rewards, daily_streak, \
                       last_active_date, created_at, updated_at";

/// Provides profile and reward-balance operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a profile, or refresh email and names if the id already exists.
    /// Reward fields are never touched here.
    pub async fn upsert(pool: &PgPool, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, name, display_name) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                email = EXCLUDED.email, \
                name = EXCLUDED.name, \
                display_name = EXCLUDED.display_name, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Profiles for a set of ids. Unknown ids are skipped.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Apply one completion event to the user's balance and streak.
    ///
    /// The row is locked for the duration of the read-modify-write so that
    /// concurrent completions by the same user both land.
    pub async fn accrue_rewards(
        pool: &PgPool,
        id: DbId,
        reward_delta: i64,
        today: Day,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let Some(user) = sqlx::query_as::<_, User>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tracing::debug!(user_id = %id, "Reward accrual for unknown user");
            return Ok(None);
        };

        let ledger = user.ledger().accrue(reward_delta, today);
        let update = format!(
            "UPDATE users SET total_rewards = $2, daily_streak = $3, \
                last_active_date = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&update)
            .bind(id)
            .bind(ledger.total_rewards)
            .bind(ledger.daily_streak)
            .bind(ledger.last_active_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(
            user_id = %id,
            reward_delta,
            daily_streak = updated.daily_streak,
            "Reward ledger updated"
        );
        Ok(Some(updated))
    }
}
