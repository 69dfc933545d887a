//! Goal writes, the completion toggle and the completion pipeline.

use bingoals_core::error::CoreError;
use bingoals_core::milestone::{self, Milestone, MilestoneOutcome};
use bingoals_core::realtime::{BoardEvent, BoardEventType};
use bingoals_core::reflection::random_prompt;
use bingoals_core::status;
use bingoals_core::types::DbId;
use bingoals_db::models::{action_types, Board, Goal, NewActivity, Reflection};
use bingoals_db::StoreResult;
use bingoals_events::{event_types, Notice, PlatformEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::accrual;
use super::resolver::{EffectiveStatus, GoalView, ProgressResolver};
use super::{notice_kinds, CollaborationEngine};

/// Goal metadata patch. Absent fields are left alone; an empty title clears
/// the whole cell.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoal {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
}

impl UpdateGoal {
    fn clears(&self) -> bool {
        self.title.as_deref().is_some_and(|t| t.trim().is_empty())
    }
}

/// Reflection patch. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReflection {
    pub obstacles: Option<String>,
    pub victories: Option<String>,
    pub notes: Option<String>,
    pub reflection_answer: Option<String>,
}

/// Result of a toggle, as the acting viewer sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub goal: GoalView,
    pub reward_delta: i64,
    pub milestones: Vec<Milestone>,
}

impl CollaborationEngine {
    /// Existing goal at `position`, or a freshly persisted blank one.
    pub(super) async fn goal_or_blank(&self, board: &Board, position: i32) -> StoreResult<Goal> {
        match self.goal_at(board, position).await? {
            Some(goal) => Ok(goal),
            None => {
                let blank = Goal::blank(board.id, position, Utc::now());
                self.store.save_goal(&blank).await
            }
        }
    }

    /// Write the cell's shared definition. Owner only; members can only
    /// change their own progress.
    pub async fn update_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        input: UpdateGoal,
    ) -> StoreResult<GoalView> {
        let board = self.owned_board(actor, board_id).await?;
        let goal = self.goal_or_blank(&board, position).await?;
        let now = Utc::now();

        let goal = if input.clears() {
            let cleared = self.store.clear_goal(&goal.cleared(now)).await?;
            tracing::info!(board_id = %board.id, goal_id = %cleared.id, position, "Goal cleared");
            cleared
        } else {
            let mut goal = goal;
            if let Some(title) = input.title {
                goal.title = Some(title.trim().to_string());
            }
            if input.description.is_some() {
                goal.description = input.description;
            }
            if input.icon.is_some() {
                goal.icon = input.icon;
            }
            if input.image_url.is_some() {
                goal.image_url = input.image_url;
            }
            if input.mood.is_some() {
                goal.mood = input.mood;
            }
            goal.updated_at = now;
            self.store.save_goal(&goal).await?
        };

        let data = serde_json::to_value(&goal).unwrap_or_default();
        self.broadcast(
            &board,
            actor,
            BoardEvent::new(BoardEventType::GoalUpdated, board.id, actor).with_data(data),
        )
        .await;

        ProgressResolver::for_board(&board)
            .view(self.store(), &goal, actor)
            .await
    }

    /// Flip the viewer's completion state for the goal at `position`.
    ///
    /// The new state is persisted before anything else happens. A genuine
    /// completion edge then runs the completion pipeline; every other
    /// transition only announces the change.
    pub async fn toggle_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
    ) -> StoreResult<ToggleOutcome> {
        let board = self.board_for(actor, board_id).await?;
        let mut goal = self.goal_or_blank(&board, position).await?;
        let resolver = ProgressResolver::for_board(&board);

        let has_mini_goals = !self.store.list_mini_goals(&[goal.id]).await?.is_empty();
        let current = resolver.state(self.store(), &goal, actor).await?;
        let transition = status::toggle(has_mini_goals, current.status);
        let next = current.toggled(transition.to, Utc::now());
        resolver
            .write_state(self.store(), &mut goal, actor, next)
            .await?;

        tracing::debug!(
            board_id = %board.id,
            goal_id = %goal.id,
            user_id = %actor,
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "Goal toggled"
        );

        let outcome = if transition.is_completion() {
            self.run_completion(&board, &goal, actor, actor).await?
        } else {
            self.announce_update(&board, &goal, actor, actor).await;
            MilestoneOutcome {
                reward_delta: 0,
                milestones: Vec::new(),
            }
        };

        Ok(ToggleOutcome {
            goal: resolver.view(self.store(), &goal, actor).await?,
            reward_delta: outcome.reward_delta,
            milestones: outcome.milestones,
        })
    }

    /// Steps that follow a persisted completion edge for `member`: milestone
    /// detection over the member's own completions, reward accrual, the
    /// reflection record, then realtime and notification fan-out.
    pub(super) async fn run_completion(
        &self,
        board: &Board,
        goal: &Goal,
        member: DbId,
        originator: DbId,
    ) -> StoreResult<MilestoneOutcome> {
        let scope = ProgressResolver::for_board(board).completion_scope(member);
        let mut completed = self.store.completed_positions(board.id, scope).await?;
        completed.insert(goal.position);

        let outcome = milestone::detect(&completed, board.grid(), goal.position);
        // The state change is already persisted; accrual failure only logs.
        if let Err(e) = accrual::accrue(self.store(), member, outcome.reward_delta).await {
            tracing::warn!(
                user_id = %member,
                reward_delta = outcome.reward_delta,
                error = %e,
                "Reward accrual skipped"
            );
        }
        self.store.ensure_reflection(goal.id, random_prompt()).await?;

        let name = self.display_name(member).await;
        self.record_activity(
            board,
            NewActivity {
                board_id: board.id,
                user_id: member,
                action_type: action_types::GOAL_COMPLETED,
                target_id: Some(goal.id),
                metadata: Some(json!({
                    "goalTitle": goal.display_title(),
                    "position": goal.position,
                })),
            },
        )
        .await;

        self.broadcast(
            board,
            originator,
            BoardEvent::new(BoardEventType::GoalCompleted, board.id, member).with_data(json!({
                "goalId": goal.id,
                "goalTitle": goal.display_title(),
                "position": goal.position,
                "userName": name,
                "milestones": outcome.labels(),
            })),
        )
        .await;

        self.notify(
            board,
            member,
            PlatformEvent::new(event_types::GOAL_COMPLETED),
            Notice::new(
                notice_kinds::GOAL_COMPLETED,
                "Goal completed!",
                format!(
                    "{name} completed \"{}\" on {}",
                    goal.display_title(),
                    board.title
                ),
            )
            .with_metadata(json!({ "boardId": board.id, "goalId": goal.id })),
        );

        tracing::info!(
            board_id = %board.id,
            goal_id = %goal.id,
            user_id = %member,
            position = goal.position,
            reward_delta = outcome.reward_delta,
            milestones = ?outcome.labels(),
            "Goal completed"
        );
        Ok(outcome)
    }

    /// `goal_updated` for a state change that is not a completion.
    pub(super) async fn announce_update(
        &self,
        board: &Board,
        goal: &Goal,
        member: DbId,
        originator: DbId,
    ) {
        self.broadcast(
            board,
            originator,
            BoardEvent::new(BoardEventType::GoalUpdated, board.id, member).with_data(json!({
                "goalId": goal.id,
                "position": goal.position,
            })),
        )
        .await;
    }

    /// The viewer's effective status at `position`. A cell that has never
    /// been written reads as not started.
    pub async fn effective_status(
        &self,
        viewer: DbId,
        board_id: DbId,
        position: i32,
    ) -> StoreResult<EffectiveStatus> {
        let board = self.board_for(viewer, board_id).await?;
        match self.goal_at(&board, position).await? {
            Some(goal) => {
                ProgressResolver::for_board(&board)
                    .effective_status(self.store(), &goal, viewer)
                    .await
            }
            None => Ok(status::ProgressState::default().into()),
        }
    }

    pub async fn reflection(
        &self,
        viewer: DbId,
        board_id: DbId,
        position: i32,
    ) -> StoreResult<Reflection> {
        let board = self.board_for(viewer, board_id).await?;
        let goal = self.require_goal_at(&board, position).await?;
        self.store
            .get_reflection(goal.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Reflection", goal.id).into())
    }

    /// Edit the reflection on the goal at `position`, creating it with a
    /// fresh prompt if the goal has none yet. Owner only.
    pub async fn update_reflection(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        input: UpdateReflection,
    ) -> StoreResult<Reflection> {
        let board = self.owned_board(actor, board_id).await?;
        let goal = self.require_goal_at(&board, position).await?;

        let mut reflection = match self.store.get_reflection(goal.id).await? {
            Some(existing) => existing,
            None => Reflection::blank(goal.id, random_prompt(), Utc::now()),
        };
        if input.obstacles.is_some() {
            reflection.obstacles = input.obstacles;
        }
        if input.victories.is_some() {
            reflection.victories = input.victories;
        }
        if input.notes.is_some() {
            reflection.notes = input.notes;
        }
        if input.reflection_answer.is_some() {
            reflection.reflection_answer = input.reflection_answer;
        }

        let saved = self.store.save_reflection(&reflection).await?;
        tracing::debug!(board_id = %board.id, goal_id = %goal.id, "Reflection saved");
        Ok(saved)
    }
}
