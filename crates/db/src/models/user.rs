//! User profile model.

use bingoals_core::rewards::{RewardLedger, RewardLevel};
use bingoals_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub display_name: String,
    pub total_rewards: i64,
    pub daily_streak: i32,
    pub last_active_date: Option<Day>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn ledger(&self) -> RewardLedger {
        RewardLedger {
            total_rewards: self.total_rewards,
            daily_streak: self.daily_streak,
            last_active_date: self.last_active_date,
        }
    }

    pub fn level(&self) -> RewardLevel {
        self.ledger().level()
    }

    /// Name shown to other members: display name, then name, then email.
    pub fn label(&self) -> &str {
        [&self.display_name, &self.name, &self.email]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("Someone")
    }
}

/// Profile fields for creating or refreshing a user. The id comes from the
/// authenticated token subject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(skip)]
    pub id: DbId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}
