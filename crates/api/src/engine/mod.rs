//! The collaboration engine: board access, goal and mini-goal state
//! changes, completion side effects and realtime fan-out.
//!
//! Every operation takes the acting user explicitly and returns
//! [`StoreResult`]; domain failures travel as `StoreError::Core`.
//!
//! - [`resolver`] -- effective status per viewer (canonical vs overlay).
//! - [`accrual`] -- reward balance and streak updates.
//! - `boards`, `goals`, `mini_goals`, `comments`, `reactions` -- the
//!   operations, as `impl CollaborationEngine` blocks.
//!
//! Shared definitions (goal metadata, mini-goals, reflections) are written
//! by the board owner only. Members change nothing but their own progress,
//! comments and reactions.

use std::sync::Arc;

use bingoals_core::error::CoreError;
use bingoals_core::realtime::BoardEvent;
use bingoals_core::types::DbId;
use bingoals_db::models::{Board, Goal, NewActivity};
use bingoals_db::{ProgressStore, StoreResult};
use bingoals_events::{EventBus, Notice, PlatformEvent};

use crate::ws::BoardHub;

pub mod accrual;
mod boards;
mod comments;
mod goals;
mod mini_goals;
mod reactions;
pub mod resolver;

pub use boards::{
    AddMember, BoardSummary, BoardView, CreateBoard, CreateInvite, MemberInfo, UpdateBoard,
};
pub use comments::CreateComment;
pub use goals::{ToggleOutcome, UpdateGoal, UpdateReflection};
pub use mini_goals::{CreateMiniGoal, MiniGoalToggleOutcome, UpdateMiniGoal};
pub use reactions::{ReactToGoal, ReactionOutcome};
pub use resolver::{EffectiveStatus, GoalView, MiniGoalView, ProgressResolver};

/// Notification kinds, stored as `notifications.notification_type`.
pub mod notice_kinds {
    pub const GOAL_COMPLETED: &str = "goal_completed";
    pub const MEMBER_JOINED: &str = "member_joined";
    pub const COMMENT_ADDED: &str = "comment_added";
    pub const REACTION_RECEIVED: &str = "reaction_received";
}

pub struct CollaborationEngine {
    store: Arc<dyn ProgressStore>,
    hub: Arc<BoardHub>,
    events: Arc<EventBus>,
}

impl CollaborationEngine {
    pub fn new(store: Arc<dyn ProgressStore>, hub: Arc<BoardHub>, events: Arc<EventBus>) -> Self {
        Self { store, hub, events }
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// The board, if `viewer` owns it or is a member. Anything else reads as
    /// not found, so boards stay invisible to outsiders.
    pub async fn board_for(&self, viewer: DbId, board_id: DbId) -> StoreResult<Board> {
        let board = self
            .store
            .get_board(board_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Board", board_id))?;

        if board.is_owner(viewer) || self.store.get_board_member(board_id, viewer).await?.is_some() {
            Ok(board)
        } else {
            Err(CoreError::not_found("Board", board_id).into())
        }
    }

    /// Board visible to `actor` and owned by them.
    async fn owned_board(&self, actor: DbId, board_id: DbId) -> StoreResult<Board> {
        let board = self.board_for(actor, board_id).await?;
        if !board.is_owner(actor) {
            return Err(CoreError::Forbidden("Only the board owner can do this".into()).into());
        }
        Ok(board)
    }

    /// Existing goal at a validated position.
    async fn goal_at(&self, board: &Board, position: i32) -> StoreResult<Option<Goal>> {
        let position = board.grid().validate_position(position)?;
        self.store.find_goal_at(board.id, position).await
    }

    async fn require_goal_at(&self, board: &Board, position: i32) -> StoreResult<Goal> {
        self.goal_at(board, position)
            .await?
            .ok_or_else(|| CoreError::not_found("Goal", format!("{}@{position}", board.id)).into())
    }

    /// Name shown to other members for `user_id`.
    async fn display_name(&self, user_id: DbId) -> String {
        match self.store.get_user(user_id).await {
            Ok(Some(user)) => user.label().to_string(),
            Ok(None) => "Someone".to_string(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load user name");
                "Someone".to_string()
            }
        }
    }

    /// Push an event to the board's room. Personal boards have no audience.
    async fn broadcast(&self, board: &Board, originator: DbId, event: BoardEvent) {
        if board.kind().is_shared() {
            self.hub.publish(board.id, originator, &event).await;
        }
    }

    /// Queue a notice on a shared board. It reaches every other member
    /// unless the event names its own recipients.
    fn notify(&self, board: &Board, actor: DbId, event: PlatformEvent, notice: Notice) {
        if board.kind().is_shared() {
            self.events
                .publish(event.on_board(board.id).with_actor(actor).with_notice(notice));
        }
    }

    /// Record a feed entry on a shared board. A failure here never fails
    /// the operation.
    async fn record_activity(&self, board: &Board, activity: NewActivity) {
        if !board.kind().is_shared() {
            return;
        }
        let action = activity.action_type;
        if let Err(e) = self.store.record_activity(activity).await {
            tracing::warn!(action_type = action, error = %e, "Failed to record activity");
        }
    }
}
