//! The persistence contract consumed by the service layer.
//!
//! [`ProgressStore`] is the only shared mutable resource in the system.
//! Every method is a single unit of work: multi-row writes (board creation,
//! goal clearing, reward accrual) are atomic in both implementations.
//! Lookups of overlay rows return `None` when absent; absence is the
//! not-started default, never an error.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bingoals_core::error::CoreError;
use bingoals_core::types::{Day, DbId};

use crate::models::{
    Activity, Board, BoardInvite, BoardMember, Comment, Goal, GoalMember, MiniGoal,
    MiniGoalMember, NewActivity, NewBoard, NewInvite, NewNotification, NewUser, Notification,
    Reaction, Reflection, User,
};

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whose completion state a completed-position scan reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionScope {
    /// Canonical `goals.is_completed` (personal boards).
    Canonical,
    /// One member's `goal_members` overlays (shared boards).
    Member(DbId),
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    // ----- Users -----

    /// Create a profile or refresh its names. Reward fields are untouched.
    async fn upsert_user(&self, input: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: DbId) -> StoreResult<Option<User>>;
    /// Profiles for the given ids, in no particular order. Unknown ids are
    /// skipped.
    async fn list_users(&self, ids: &[DbId]) -> StoreResult<Vec<User>>;
    /// Apply one completion event to the user's ledger, atomically.
    async fn accrue_rewards(&self, user_id: DbId, reward_delta: i64, today: Day)
        -> StoreResult<User>;

    // ----- Boards and membership -----

    /// Insert a board and its owner membership. The owner's first board
    /// becomes their default.
    async fn create_board(&self, input: NewBoard) -> StoreResult<Board>;
    async fn get_board(&self, id: DbId) -> StoreResult<Option<Board>>;
    /// Boards the user owns or is a member of, newest first.
    async fn list_boards_for_user(&self, user_id: DbId) -> StoreResult<Vec<Board>>;
    /// Save title, year, member limit and default flag. Setting the default
    /// flag clears it on the owner's other boards.
    async fn update_board(&self, board: &Board) -> StoreResult<Board>;
    /// Delete a board and everything under it. Returns `false` if absent.
    async fn delete_board(&self, id: DbId) -> StoreResult<bool>;
    async fn list_board_members(&self, board_id: DbId) -> StoreResult<Vec<BoardMember>>;
    async fn get_board_member(&self, board_id: DbId, user_id: DbId)
        -> StoreResult<Option<BoardMember>>;
    /// Fails with [`CoreError::Conflict`] (or a unique violation) if the
    /// user is already a member.
    async fn add_board_member(&self, board_id: DbId, user_id: DbId, role: &str)
        -> StoreResult<BoardMember>;
    async fn remove_board_member(&self, board_id: DbId, user_id: DbId) -> StoreResult<bool>;

    // ----- Invites -----

    async fn create_invite(&self, input: NewInvite) -> StoreResult<BoardInvite>;
    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<BoardInvite>>;
    /// Take one use of the invite and add `user_id` as a member, atomically.
    /// Returns `None`, with nothing written, once the use limit is reached.
    async fn redeem_invite(&self, invite_id: DbId, user_id: DbId)
        -> StoreResult<Option<BoardMember>>;

    // ----- Goals -----

    async fn get_goal(&self, id: DbId) -> StoreResult<Option<Goal>>;
    async fn find_goal_at(&self, board_id: DbId, position: i32) -> StoreResult<Option<Goal>>;
    async fn list_goals(&self, board_id: DbId) -> StoreResult<Vec<Goal>>;
    /// Insert or overwrite by id.
    async fn save_goal(&self, goal: &Goal) -> StoreResult<Goal>;
    /// Persist a reset goal and delete its mini-goals, overlays and
    /// reflection in one unit.
    async fn clear_goal(&self, reset: &Goal) -> StoreResult<Goal>;
    async fn completed_positions(&self, board_id: DbId, scope: CompletionScope)
        -> StoreResult<HashSet<i32>>;

    // ----- Mini-goals -----

    async fn get_mini_goal(&self, id: DbId) -> StoreResult<Option<MiniGoal>>;
    async fn list_mini_goals(&self, goal_ids: &[DbId]) -> StoreResult<Vec<MiniGoal>>;
    async fn save_mini_goal(&self, mini: &MiniGoal) -> StoreResult<MiniGoal>;
    /// Delete a mini-goal and its overlay rows.
    async fn delete_mini_goal(&self, id: DbId) -> StoreResult<bool>;

    // ----- Overlays -----

    async fn get_goal_member(&self, goal_id: DbId, user_id: DbId)
        -> StoreResult<Option<GoalMember>>;
    async fn list_goal_members(&self, goal_ids: &[DbId], user_id: DbId)
        -> StoreResult<Vec<GoalMember>>;
    /// Every overlay row on one goal, across all members.
    async fn list_goal_member_holders(&self, goal_id: DbId) -> StoreResult<Vec<GoalMember>>;
    async fn completed_member_counts(&self, goal_ids: &[DbId]) -> StoreResult<HashMap<DbId, i64>>;
    /// Upsert keyed by `(goal_id, user_id)`.
    async fn save_goal_member(&self, member: &GoalMember) -> StoreResult<GoalMember>;
    async fn list_mini_goal_members(&self, mini_goal_ids: &[DbId], user_id: DbId)
        -> StoreResult<Vec<MiniGoalMember>>;
    /// Upsert keyed by `(mini_goal_id, user_id)`.
    async fn save_mini_goal_member(&self, member: &MiniGoalMember) -> StoreResult<MiniGoalMember>;

    // ----- Reflections -----

    async fn get_reflection(&self, goal_id: DbId) -> StoreResult<Option<Reflection>>;
    /// Create a blank reflection unless one exists. Returns `true` if created.
    async fn ensure_reflection(&self, goal_id: DbId, prompt: &str) -> StoreResult<bool>;
    /// Upsert keyed by `goal_id`.
    async fn save_reflection(&self, reflection: &Reflection) -> StoreResult<Reflection>;

    // ----- Comments -----

    async fn create_comment(&self, goal_id: DbId, user_id: DbId, text: &str)
        -> StoreResult<Comment>;
    async fn get_comment(&self, id: DbId) -> StoreResult<Option<Comment>>;
    /// Oldest first.
    async fn list_comments(&self, goal_id: DbId) -> StoreResult<Vec<Comment>>;
    async fn delete_comment(&self, id: DbId) -> StoreResult<bool>;

    // ----- Reactions -----

    async fn find_reaction(&self, goal_id: DbId, user_id: DbId, reaction_type: &str)
        -> StoreResult<Option<Reaction>>;
    /// Fails with [`CoreError::Conflict`] (or a unique violation) on a
    /// duplicate `(goal, user, type)`.
    async fn create_reaction(&self, goal_id: DbId, user_id: DbId, reaction_type: &str)
        -> StoreResult<Reaction>;
    async fn delete_reaction(&self, id: DbId) -> StoreResult<bool>;
    /// Oldest first.
    async fn list_reactions(&self, goal_id: DbId) -> StoreResult<Vec<Reaction>>;

    // ----- Activity and notifications -----

    async fn record_activity(&self, input: NewActivity) -> StoreResult<Activity>;
    async fn list_activities(&self, board_id: DbId, limit: i64) -> StoreResult<Vec<Activity>>;
    async fn create_notification(&self, input: NewNotification) -> StoreResult<Notification>;
    /// Newest first.
    async fn list_notifications(&self, user_id: DbId) -> StoreResult<Vec<Notification>>;
    /// `false` if the notification does not exist or belongs to someone else.
    async fn mark_notification_read(&self, user_id: DbId, id: DbId) -> StoreResult<bool>;
    /// Returns how many were unread.
    async fn mark_all_notifications_read(&self, user_id: DbId) -> StoreResult<u64>;
}
