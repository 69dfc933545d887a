//! Mini-goal definitions, their toggles and the progress recompute.

use std::collections::BTreeSet;

use bingoals_core::error::CoreError;
use bingoals_core::milestone::{Milestone, MilestoneOutcome};
use bingoals_core::status::{
    check_percentage_quota, progress_from_mini_goals, validate_mini_goal_title,
    validate_percentage,
};
use bingoals_core::types::DbId;
use bingoals_db::models::{Board, Goal, MiniGoal, MiniGoalMember};
use bingoals_db::StoreResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::resolver::{GoalView, MiniGoalView, ProgressResolver};
use super::CollaborationEngine;

#[derive(Debug, Deserialize)]
pub struct CreateMiniGoal {
    pub title: String,
    pub percentage: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMiniGoal {
    pub title: Option<String>,
    pub percentage: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGoalToggleOutcome {
    pub mini_goal: MiniGoalView,
    pub goal: GoalView,
    pub reward_delta: i64,
    pub milestones: Vec<Milestone>,
}

fn no_reward() -> MilestoneOutcome {
    MilestoneOutcome {
        reward_delta: 0,
        milestones: Vec::new(),
    }
}

impl CollaborationEngine {
    /// Mini-goal `mini_goal_id` of `goal`. A mini-goal that belongs to some
    /// other goal reads as not found.
    async fn mini_goal_of(&self, goal: &Goal, mini_goal_id: DbId) -> StoreResult<MiniGoal> {
        self.store
            .get_mini_goal(mini_goal_id)
            .await?
            .filter(|m| m.goal_id == goal.id)
            .ok_or_else(|| CoreError::not_found("MiniGoal", mini_goal_id).into())
    }

    /// Weights of every other mini-goal on `goal`.
    async fn other_percentages(&self, goal: &Goal, except: Option<DbId>) -> StoreResult<Vec<i32>> {
        Ok(self
            .store
            .list_mini_goals(&[goal.id])
            .await?
            .into_iter()
            .filter(|m| Some(m.id) != except)
            .map(|m| m.percentage)
            .collect())
    }

    pub async fn create_mini_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        input: CreateMiniGoal,
    ) -> StoreResult<GoalView> {
        let board = self.owned_board(actor, board_id).await?;
        let mut goal = self.require_goal_at(&board, position).await?;

        let title = validate_mini_goal_title(&input.title)?;
        validate_percentage(input.percentage)?;
        check_percentage_quota(self.other_percentages(&goal, None).await?, input.percentage)?;

        let mini = self
            .store
            .save_mini_goal(&MiniGoal::new(goal.id, title, input.percentage, Utc::now()))
            .await?;
        tracing::debug!(goal_id = %goal.id, mini_goal_id = %mini.id, percentage = mini.percentage, "Mini-goal created");

        self.recompute_holders(&board, &mut goal, actor).await?;
        ProgressResolver::for_board(&board)
            .view(self.store(), &goal, actor)
            .await
    }

    pub async fn update_mini_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        mini_goal_id: DbId,
        input: UpdateMiniGoal,
    ) -> StoreResult<GoalView> {
        let board = self.owned_board(actor, board_id).await?;
        let mut goal = self.require_goal_at(&board, position).await?;
        let mut mini = self.mini_goal_of(&goal, mini_goal_id).await?;

        if let Some(title) = input.title {
            mini.title = validate_mini_goal_title(&title)?;
        }
        if let Some(percentage) = input.percentage {
            validate_percentage(percentage)?;
            check_percentage_quota(
                self.other_percentages(&goal, Some(mini.id)).await?,
                percentage,
            )?;
            mini.percentage = percentage;
        }
        mini.updated_at = Utc::now();
        self.store.save_mini_goal(&mini).await?;

        self.recompute_holders(&board, &mut goal, actor).await?;
        ProgressResolver::for_board(&board)
            .view(self.store(), &goal, actor)
            .await
    }

    pub async fn delete_mini_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        mini_goal_id: DbId,
    ) -> StoreResult<GoalView> {
        let board = self.owned_board(actor, board_id).await?;
        let mut goal = self.require_goal_at(&board, position).await?;
        let mini = self.mini_goal_of(&goal, mini_goal_id).await?;

        // Holders are collected before the overlay rows go away.
        let holders = self.recompute_targets(&board, &goal, actor).await?;
        self.store.delete_mini_goal(mini.id).await?;
        tracing::debug!(goal_id = %goal.id, mini_goal_id = %mini.id, "Mini-goal deleted");

        for member in holders {
            self.recompute(&board, &mut goal, member, actor).await?;
        }
        ProgressResolver::for_board(&board)
            .view(self.store(), &goal, actor)
            .await
    }

    /// Flip the viewer's completion flag on one mini-goal and recompute the
    /// viewer's progress on the owning goal.
    pub async fn toggle_mini_goal(
        &self,
        actor: DbId,
        board_id: DbId,
        position: i32,
        mini_goal_id: DbId,
    ) -> StoreResult<MiniGoalToggleOutcome> {
        let board = self.board_for(actor, board_id).await?;
        let mut goal = self.require_goal_at(&board, position).await?;
        let mut mini = self.mini_goal_of(&goal, mini_goal_id).await?;
        let resolver = ProgressResolver::for_board(&board);
        let now = Utc::now();

        let is_complete = match resolver {
            ProgressResolver::Canonical => {
                mini.is_complete = !mini.is_complete;
                mini.updated_at = now;
                mini = self.store.save_mini_goal(&mini).await?;
                mini.is_complete
            }
            ProgressResolver::Overlay => {
                let mut overlay = self
                    .store
                    .list_mini_goal_members(&[mini.id], actor)
                    .await?
                    .pop()
                    .unwrap_or_else(|| MiniGoalMember::new(mini.id, actor, now));
                overlay.is_complete = !overlay.is_complete;
                overlay.updated_at = now;
                self.store.save_mini_goal_member(&overlay).await?.is_complete
            }
        };

        let outcome = self.recompute(&board, &mut goal, actor, actor).await?;
        Ok(MiniGoalToggleOutcome {
            mini_goal: MiniGoalView::new(&mini, is_complete),
            goal: resolver.view(self.store(), &goal, actor).await?,
            reward_delta: outcome.reward_delta,
            milestones: outcome.milestones,
        })
    }

    /// Members whose progress depends on the goal's mini-goal definitions:
    /// the actor, plus on shared boards everyone holding an overlay row.
    async fn recompute_targets(
        &self,
        board: &Board,
        goal: &Goal,
        actor: DbId,
    ) -> StoreResult<BTreeSet<DbId>> {
        let mut targets = BTreeSet::from([actor]);
        if let ProgressResolver::Overlay = ProgressResolver::for_board(board) {
            targets.extend(
                self.store
                    .list_goal_member_holders(goal.id)
                    .await?
                    .into_iter()
                    .map(|m| m.user_id),
            );
        }
        Ok(targets)
    }

    async fn recompute_holders(&self, board: &Board, goal: &mut Goal, actor: DbId) -> StoreResult<()> {
        for member in self.recompute_targets(board, goal, actor).await? {
            self.recompute(board, goal, member, actor).await?;
        }
        Ok(())
    }

    /// Derive `member`'s progress and status on `goal` from their mini-goal
    /// completions. Unchanged state writes nothing. Crossing into completed
    /// runs the completion pipeline for `member`.
    async fn recompute(
        &self,
        board: &Board,
        goal: &mut Goal,
        member: DbId,
        originator: DbId,
    ) -> StoreResult<MilestoneOutcome> {
        let resolver = ProgressResolver::for_board(board);
        let minis = self.store.list_mini_goals(&[goal.id]).await?;
        let done = resolver
            .mini_goal_completion(self.store(), &minis, member)
            .await?;
        let progress = progress_from_mini_goals(
            minis
                .iter()
                .map(|m| (m.percentage, done.get(&m.id).copied().unwrap_or(false))),
        );

        let current = resolver.state(self.store(), goal, member).await?;
        let next = current.recomputed(progress, Utc::now());
        if next.status == current.status && next.progress == current.progress {
            return Ok(no_reward());
        }
        resolver
            .write_state(self.store(), goal, member, next)
            .await?;

        let transition = current.transition_to(&next);
        tracing::debug!(
            goal_id = %goal.id,
            user_id = %member,
            progress,
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "Progress recomputed"
        );

        if transition.is_completion() {
            self.run_completion(board, goal, member, originator).await
        } else {
            self.announce_update(board, goal, member, originator).await;
            Ok(no_reward())
        }
    }
}
