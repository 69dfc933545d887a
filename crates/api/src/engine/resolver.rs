//! Effective goal status per viewer.
//!
//! Personal boards read the canonical goal and mini-goal rows. Shared
//! boards read the viewer's overlay rows and fall back to the not-started
//! default when the viewer has none; canonical completion fields on a
//! shared board are never consulted. Callers pick the strategy once with
//! [`ProgressResolver::for_board`] and never branch on board type.

use std::collections::HashMap;

use bingoals_core::board::BoardType;
use bingoals_core::status::{GoalStatus, ProgressState};
use bingoals_core::types::{DbId, Timestamp};
use bingoals_db::models::{Board, Goal, GoalMember, MiniGoal, MiniGoalMember};
use bingoals_db::{CompletionScope, ProgressStore, StoreResult};
use chrono::Utc;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Completion fields as one viewer sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveStatus {
    pub status: GoalStatus,
    pub is_completed: bool,
    pub progress: i32,
    pub completed_at: Option<Timestamp>,
}

impl From<ProgressState> for EffectiveStatus {
    fn from(state: ProgressState) -> Self {
        Self {
            status: state.status,
            is_completed: state.is_completed(),
            progress: state.progress,
            completed_at: state.completed_at,
        }
    }
}

/// A mini-goal with its completion flag resolved for one viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGoalView {
    pub id: DbId,
    pub goal_id: DbId,
    pub title: String,
    pub percentage: i32,
    pub is_complete: bool,
}

impl MiniGoalView {
    pub fn new(mini: &MiniGoal, is_complete: bool) -> Self {
        Self {
            id: mini.id,
            goal_id: mini.goal_id,
            title: mini.title.clone(),
            percentage: mini.percentage,
            is_complete,
        }
    }
}

/// A goal with its metadata and the viewer's effective state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub id: DbId,
    pub board_id: DbId,
    pub position: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
    #[serde(flatten)]
    pub effective: EffectiveStatus,
    /// Distinct members who completed this goal. Shared boards only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by_count: Option<i64>,
    pub mini_goals: Vec<MiniGoalView>,
}

impl GoalView {
    pub fn new(goal: &Goal, effective: EffectiveStatus, mini_goals: Vec<MiniGoalView>) -> Self {
        Self {
            id: goal.id,
            board_id: goal.board_id,
            position: goal.position,
            title: goal.title.clone(),
            description: goal.description.clone(),
            icon: goal.icon.clone(),
            image_url: goal.image_url.clone(),
            mood: goal.mood.clone(),
            effective,
            completed_by_count: None,
            mini_goals,
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressResolver
// ---------------------------------------------------------------------------

/// Where completion state for a board lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressResolver {
    /// Goal and mini-goal rows themselves.
    Canonical,
    /// `goal_members` / `mini_goal_members`, one row per viewer.
    Overlay,
}

impl ProgressResolver {
    /// Strategy for a board. Unknown board types read as personal.
    pub fn for_board(board: &Board) -> Self {
        match board.kind() {
            BoardType::Personal => Self::Canonical,
            BoardType::Shared => Self::Overlay,
        }
    }

    /// Completed-position scan scope for milestone detection.
    pub fn completion_scope(self, viewer: DbId) -> CompletionScope {
        match self {
            Self::Canonical => CompletionScope::Canonical,
            Self::Overlay => CompletionScope::Member(viewer),
        }
    }

    /// The viewer's completion state for one goal.
    pub async fn state(
        self,
        store: &dyn ProgressStore,
        goal: &Goal,
        viewer: DbId,
    ) -> StoreResult<ProgressState> {
        match self {
            Self::Canonical => Ok(goal.state()),
            Self::Overlay => Ok(store
                .get_goal_member(goal.id, viewer)
                .await?
                .map(|m| m.state())
                .unwrap_or_default()),
        }
    }

    pub async fn effective_status(
        self,
        store: &dyn ProgressStore,
        goal: &Goal,
        viewer: DbId,
    ) -> StoreResult<EffectiveStatus> {
        Ok(self.state(store, goal, viewer).await?.into())
    }

    /// Persist `state` as the viewer's state for `goal`.
    pub async fn write_state(
        self,
        store: &dyn ProgressStore,
        goal: &mut Goal,
        viewer: DbId,
        state: ProgressState,
    ) -> StoreResult<()> {
        let now = Utc::now();
        match self {
            Self::Canonical => {
                goal.apply_state(state, viewer, now);
                *goal = store.save_goal(goal).await?;
            }
            Self::Overlay => {
                let mut member = store
                    .get_goal_member(goal.id, viewer)
                    .await?
                    .unwrap_or_else(|| GoalMember::new(goal.id, viewer, now));
                member.apply_state(state, now);
                store.save_goal_member(&member).await?;
            }
        }
        Ok(())
    }

    /// Completion flag of each mini-goal as `viewer` sees it.
    pub async fn mini_goal_completion(
        self,
        store: &dyn ProgressStore,
        minis: &[MiniGoal],
        viewer: DbId,
    ) -> StoreResult<HashMap<DbId, bool>> {
        match self {
            Self::Canonical => Ok(minis.iter().map(|m| (m.id, m.is_complete)).collect()),
            Self::Overlay => {
                let ids: Vec<DbId> = minis.iter().map(|m| m.id).collect();
                let overlays: HashMap<DbId, bool> = store
                    .list_mini_goal_members(&ids, viewer)
                    .await?
                    .into_iter()
                    .map(|m: MiniGoalMember| (m.mini_goal_id, m.is_complete))
                    .collect();
                Ok(minis
                    .iter()
                    .map(|m| (m.id, overlays.get(&m.id).copied().unwrap_or(false)))
                    .collect())
            }
        }
    }

    /// Resolve a whole set of goals for one viewer.
    ///
    /// Issues a fixed number of store calls regardless of how many goals are
    /// passed: mini-goals, then (shared boards) the viewer's goal overlays,
    /// mini-goal overlays and completed-by counts.
    pub async fn effective_status_batch(
        self,
        store: &dyn ProgressStore,
        goals: &[Goal],
        viewer: DbId,
    ) -> StoreResult<Vec<GoalView>> {
        if goals.is_empty() {
            return Ok(Vec::new());
        }
        let goal_ids: Vec<DbId> = goals.iter().map(|g| g.id).collect();

        let minis = store.list_mini_goals(&goal_ids).await?;
        let mini_done = self.mini_goal_completion(store, &minis, viewer).await?;

        let (overlays, counts) = match self {
            Self::Canonical => (HashMap::new(), None),
            Self::Overlay => {
                let overlays: HashMap<DbId, ProgressState> = store
                    .list_goal_members(&goal_ids, viewer)
                    .await?
                    .into_iter()
                    .map(|m| (m.goal_id, m.state()))
                    .collect();
                let counts = store.completed_member_counts(&goal_ids).await?;
                (overlays, Some(counts))
            }
        };

        let mut minis_by_goal: HashMap<DbId, Vec<MiniGoalView>> = HashMap::new();
        for mini in &minis {
            let done = mini_done.get(&mini.id).copied().unwrap_or(false);
            minis_by_goal
                .entry(mini.goal_id)
                .or_default()
                .push(MiniGoalView::new(mini, done));
        }

        Ok(goals
            .iter()
            .map(|goal| {
                let state = match self {
                    Self::Canonical => goal.state(),
                    Self::Overlay => overlays.get(&goal.id).copied().unwrap_or_default(),
                };
                let mut view = GoalView::new(
                    goal,
                    state.into(),
                    minis_by_goal.remove(&goal.id).unwrap_or_default(),
                );
                view.completed_by_count = counts
                    .as_ref()
                    .map(|c| c.get(&goal.id).copied().unwrap_or(0));
                view
            })
            .collect())
    }

    /// One goal resolved for one viewer, mini-goals included.
    pub async fn view(
        self,
        store: &dyn ProgressStore,
        goal: &Goal,
        viewer: DbId,
    ) -> StoreResult<GoalView> {
        let mut views = self
            .effective_status_batch(store, std::slice::from_ref(goal), viewer)
            .await?;
        Ok(views.pop().unwrap_or_else(|| {
            GoalView::new(goal, ProgressState::default().into(), Vec::new())
        }))
    }
}
