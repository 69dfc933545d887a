//! Reward balance and daily streak bookkeeping.

use serde::{Deserialize, Serialize};

use crate::types::Day;

/// The reward-related fields of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardLedger {
    pub total_rewards: i64,
    pub daily_streak: i32,
    pub last_active_date: Option<Day>,
}

impl RewardLedger {
    /// Apply one completion event that happened on `today`.
    ///
    /// The balance only ever grows. The streak continues on consecutive
    /// days, is unchanged for repeat activity on the same day, and restarts
    /// at 1 after a gap. `last_active_date` always becomes `today`.
    pub fn accrue(self, reward_delta: i64, today: Day) -> Self {
        let daily_streak = match self.last_active_date {
            None => 1,
            Some(last) => match (today - last).num_days() {
                1 => self.daily_streak + 1,
                d if d > 1 => 1,
                _ => self.daily_streak,
            },
        };

        Self {
            total_rewards: self.total_rewards + reward_delta.max(0),
            daily_streak,
            last_active_date: Some(today),
        }
    }

    pub fn level(&self) -> RewardLevel {
        RewardLevel::for_total(self.total_rewards)
    }
}

/// Tier derived from the lifetime reward balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardLevel {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl RewardLevel {
    pub fn for_total(total: i64) -> Self {
        match total {
            t if t >= 2000 => Self::Diamond,
            t if t >= 500 => Self::Gold,
            t if t >= 100 => Self::Silver,
            _ => Self::Bronze,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
