//! Goal status state machine and mini-goal progress math.
//!
//! The same transition table drives canonical goal rows (personal boards)
//! and per-member overlay rows (shared boards).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// GoalStatus
// ---------------------------------------------------------------------------

/// Stored status values (`goals.status`, `goal_members.status`).
pub mod status_values {
    pub const NOT_STARTED: &str = "not_started";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    /// Parse a stored status. Unknown values read as `NotStarted`.
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            status_values::IN_PROGRESS => Self::InProgress,
            status_values::COMPLETED => Self::Completed,
            _ => Self::NotStarted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => status_values::NOT_STARTED,
            Self::InProgress => status_values::IN_PROGRESS,
            Self::Completed => status_values::COMPLETED,
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// A status change produced by the transition table or a progress recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GoalStatus,
    pub to: GoalStatus,
}

impl Transition {
    /// `true` for the not-completed → completed edge that earns rewards.
    pub fn is_completion(self) -> bool {
        !self.from.is_completed() && self.to.is_completed()
    }

    pub fn is_noop(self) -> bool {
        self.from == self.to
    }
}

/// Direct toggle table, keyed by `(has_mini_goals, current)`.
///
/// A direct toggle never produces `InProgress`: that state is only reached
/// through [`status_for_progress`] when mini-goals are recomputed.
const TOGGLE_TABLE: [((bool, GoalStatus), GoalStatus); 6] = [
    ((false, GoalStatus::NotStarted), GoalStatus::Completed),
    ((false, GoalStatus::InProgress), GoalStatus::Completed),
    ((false, GoalStatus::Completed), GoalStatus::NotStarted),
    ((true, GoalStatus::NotStarted), GoalStatus::Completed),
    ((true, GoalStatus::InProgress), GoalStatus::Completed),
    ((true, GoalStatus::Completed), GoalStatus::NotStarted),
];

/// Look up the next state for an explicit goal toggle.
pub fn toggle(has_mini_goals: bool, current: GoalStatus) -> Transition {
    let to = TOGGLE_TABLE
        .iter()
        .find(|(key, _)| *key == (has_mini_goals, current))
        .map(|(_, next)| *next)
        .unwrap_or(GoalStatus::NotStarted);
    Transition { from: current, to }
}

// ---------------------------------------------------------------------------
// ProgressState
// ---------------------------------------------------------------------------

/// The completion fields shared by canonical goal rows and member overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub status: GoalStatus,
    pub progress: i32,
    pub completed_at: Option<Timestamp>,
}

impl ProgressState {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// State after an explicit toggle to `to`. Progress is left alone; only
    /// the mini-goal recompute writes it.
    pub fn toggled(self, to: GoalStatus, now: Timestamp) -> Self {
        Self {
            status: to,
            progress: self.progress,
            completed_at: to.is_completed().then_some(now),
        }
    }

    /// State after recomputing mini-goal progress. A goal that was already
    /// completed keeps its original completion time.
    pub fn recomputed(self, progress: i32, now: Timestamp) -> Self {
        let status = status_for_progress(progress);
        let completed_at = match (status.is_completed(), self.completed_at) {
            (true, Some(at)) if self.is_completed() => Some(at),
            (true, _) => Some(now),
            (false, _) => None,
        };
        Self {
            status,
            progress,
            completed_at,
        }
    }

    pub fn transition_to(&self, next: &ProgressState) -> Transition {
        Transition {
            from: self.status,
            to: next.status,
        }
    }
}

// ---------------------------------------------------------------------------
// Mini-goal progress
// ---------------------------------------------------------------------------

pub const MIN_PERCENTAGE: i32 = 1;
pub const MAX_PERCENTAGE: i32 = 100;

/// Sum of completed mini-goal weights, capped at 100.
pub fn progress_from_mini_goals<I>(mini_goals: I) -> i32
where
    I: IntoIterator<Item = (i32, bool)>,
{
    mini_goals
        .into_iter()
        .filter(|(_, complete)| *complete)
        .map(|(percentage, _)| percentage)
        .sum::<i32>()
        .clamp(0, MAX_PERCENTAGE)
}

/// Derived status for a recomputed progress value.
pub fn status_for_progress(progress: i32) -> GoalStatus {
    if progress >= MAX_PERCENTAGE {
        GoalStatus::Completed
    } else if progress > 0 {
        GoalStatus::InProgress
    } else {
        GoalStatus::NotStarted
    }
}

/// Validate a single mini-goal weight.
pub fn validate_percentage(percentage: i32) -> Result<(), CoreError> {
    if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&percentage) {
        return Err(CoreError::Validation(format!(
            "Percentage must be between {MIN_PERCENTAGE} and {MAX_PERCENTAGE}, got {percentage}"
        )));
    }
    Ok(())
}

/// Check that adding `requested` to the weights of the *other* mini-goals
/// of a goal stays within 100%.
pub fn check_percentage_quota<I>(others: I, requested: i32) -> Result<(), CoreError>
where
    I: IntoIterator<Item = i32>,
{
    let allocated: i32 = others.into_iter().sum();
    if allocated + requested > MAX_PERCENTAGE {
        return Err(CoreError::QuotaExceeded {
            requested: allocated + requested,
            allocated,
        });
    }
    Ok(())
}

/// Validate a mini-goal title. Returns the trimmed title.
pub fn validate_mini_goal_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title is required".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
