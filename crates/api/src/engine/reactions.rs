//! Goal reactions.

use bingoals_core::reaction::ReactionKind;
use bingoals_core::types::DbId;
use bingoals_db::models::{Board, Goal, Reaction};
use bingoals_db::StoreResult;
use bingoals_events::{event_types, Notice, PlatformEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::resolver::ProgressResolver;
use super::{notice_kinds, CollaborationEngine};

#[derive(Debug, Deserialize)]
pub struct ReactToGoal {
    #[serde(rename = "type")]
    pub reaction_type: String,
}

/// Result of a reaction toggle. `reaction` is present only when one was
/// added.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionOutcome {
    pub added: bool,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
}

impl CollaborationEngine {
    /// Add the actor's reaction of this kind, or remove it if present.
    ///
    /// An added reaction notifies whoever has completed the goal, except
    /// the actor.
    pub async fn toggle_reaction(
        &self,
        actor: DbId,
        goal_id: DbId,
        input: ReactToGoal,
    ) -> StoreResult<ReactionOutcome> {
        let kind = ReactionKind::parse(&input.reaction_type)?;
        let (goal, board) = self.goal_with_board(actor, goal_id).await?;

        if let Some(existing) = self
            .store
            .find_reaction(goal.id, actor, kind.as_str())
            .await?
        {
            self.store.delete_reaction(existing.id).await?;
            return Ok(ReactionOutcome {
                added: false,
                kind,
                reaction: None,
            });
        }

        let reaction = self
            .store
            .create_reaction(goal.id, actor, kind.as_str())
            .await?;

        let completers: Vec<DbId> = self
            .completers(&board, &goal)
            .await?
            .into_iter()
            .filter(|id| *id != actor)
            .collect();
        if !completers.is_empty() {
            let name = self.display_name(actor).await;
            self.notify(
                &board,
                actor,
                PlatformEvent::new(event_types::REACTION_ADDED).to_recipients(completers),
                Notice::new(
                    notice_kinds::REACTION_RECEIVED,
                    "New reaction!",
                    format!(
                        "{name} reacted {} to \"{}\"",
                        kind.as_str(),
                        goal.display_title()
                    ),
                )
                .with_metadata(json!({ "boardId": board.id, "goalId": goal.id })),
            );
        }

        tracing::debug!(goal_id = %goal.id, user_id = %actor, kind = kind.as_str(), "Reaction added");
        Ok(ReactionOutcome {
            added: true,
            kind,
            reaction: Some(reaction),
        })
    }

    pub async fn list_reactions(&self, viewer: DbId, goal_id: DbId) -> StoreResult<Vec<Reaction>> {
        let (goal, _) = self.goal_with_board(viewer, goal_id).await?;
        self.store.list_reactions(goal.id).await
    }

    /// Users who currently hold the goal as completed.
    async fn completers(&self, board: &Board, goal: &Goal) -> StoreResult<Vec<DbId>> {
        match ProgressResolver::for_board(board) {
            ProgressResolver::Canonical => Ok(goal
                .completed_by
                .filter(|_| goal.is_completed)
                .into_iter()
                .collect()),
            ProgressResolver::Overlay => Ok(self
                .store
                .list_goal_member_holders(goal.id)
                .await?
                .into_iter()
                .filter(|m| m.is_completed)
                .map(|m| m.user_id)
                .collect()),
        }
    }
}
