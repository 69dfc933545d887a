//! Reward accrual for completion events.

use bingoals_core::rewards::RewardLevel;
use bingoals_core::types::{Day, DbId};
use bingoals_db::models::User;
use bingoals_db::{ProgressStore, StoreResult};
use chrono::Utc;
use serde::Serialize;

/// Calendar day used for streak bookkeeping. Time of day is discarded.
pub fn today() -> Day {
    Utc::now().date_naive()
}

/// Credit `reward_delta` to a user and advance their streak for `day`.
///
/// Called exactly once per completion edge, after milestone detection.
pub async fn accrue_on(
    store: &dyn ProgressStore,
    user_id: DbId,
    reward_delta: i64,
    day: Day,
) -> StoreResult<User> {
    let user = store.accrue_rewards(user_id, reward_delta, day).await?;
    tracing::debug!(
        user_id = %user_id,
        reward_delta,
        total_rewards = user.total_rewards,
        daily_streak = user.daily_streak,
        "Rewards accrued"
    );
    Ok(user)
}

pub async fn accrue(store: &dyn ProgressStore, user_id: DbId, reward_delta: i64) -> StoreResult<User> {
    accrue_on(store, user_id, reward_delta, today()).await
}

/// Reward fields of a profile, with the derived level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
    pub user_id: DbId,
    pub total_rewards: i64,
    pub daily_streak: i32,
    pub last_active_date: Option<Day>,
    pub level: RewardLevel,
}

impl From<&User> for RewardSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            total_rewards: user.total_rewards,
            daily_streak: user.daily_streak,
            last_active_date: user.last_active_date,
            level: user.level(),
        }
    }
}
