//! Goal comments, the board activity feed and per-user reads.

use bingoals_core::error::CoreError;
use bingoals_core::realtime::{BoardEvent, BoardEventType};
use bingoals_core::types::DbId;
use bingoals_db::models::{
    action_types, Activity, Board, Comment, Goal, NewActivity, NewUser, Notification, User,
};
use bingoals_db::StoreResult;
use bingoals_events::{event_types, Notice, PlatformEvent};
use serde::Deserialize;
use serde_json::json;

use super::accrual::RewardSummary;
use super::{notice_kinds, CollaborationEngine};

/// Entries returned by the activity feed.
const ACTIVITY_FEED_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub text: String,
}

impl CollaborationEngine {
    /// A goal and its board, if `viewer` can see the board.
    pub(super) async fn goal_with_board(&self, viewer: DbId, goal_id: DbId) -> StoreResult<(Goal, Board)> {
        let goal = self
            .store
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Goal", goal_id))?;
        let board = self.board_for(viewer, goal.board_id).await?;
        Ok((goal, board))
    }

    pub async fn add_comment(
        &self,
        actor: DbId,
        goal_id: DbId,
        input: CreateComment,
    ) -> StoreResult<Comment> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Comment text is required".into()).into());
        }
        let (goal, board) = self.goal_with_board(actor, goal_id).await?;
        let comment = self.store.create_comment(goal.id, actor, text).await?;

        self.record_activity(
            &board,
            NewActivity {
                board_id: board.id,
                user_id: actor,
                action_type: action_types::COMMENT_ADDED,
                target_id: Some(goal.id),
                metadata: Some(json!({ "commentId": comment.id })),
            },
        )
        .await;

        self.broadcast(
            &board,
            actor,
            BoardEvent::new(BoardEventType::CommentAdded, board.id, actor)
                .with_data(json!({ "goalId": goal.id, "commentId": comment.id })),
        )
        .await;

        let name = self.display_name(actor).await;
        self.notify(
            &board,
            actor,
            PlatformEvent::new(event_types::COMMENT_ADDED),
            Notice::new(
                notice_kinds::COMMENT_ADDED,
                "New comment",
                format!("{name} commented on \"{}\"", goal.display_title()),
            )
            .with_metadata(json!({ "boardId": board.id, "goalId": goal.id })),
        );

        Ok(comment)
    }

    pub async fn list_comments(&self, viewer: DbId, goal_id: DbId) -> StoreResult<Vec<Comment>> {
        let (goal, _) = self.goal_with_board(viewer, goal_id).await?;
        self.store.list_comments(goal.id).await
    }

    /// Authors may delete their own comments; nobody else may.
    pub async fn delete_comment(&self, actor: DbId, comment_id: DbId) -> StoreResult<()> {
        let comment = self
            .store
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
        let (goal, board) = self.goal_with_board(actor, comment.goal_id).await?;
        if comment.user_id != actor {
            return Err(CoreError::Forbidden("Only the author can delete a comment".into()).into());
        }

        self.store.delete_comment(comment.id).await?;
        self.broadcast(
            &board,
            actor,
            BoardEvent::new(BoardEventType::CommentDeleted, board.id, actor)
                .with_data(json!({ "goalId": goal.id, "commentId": comment.id })),
        )
        .await;
        Ok(())
    }

    /// Most recent activity on a board, newest first.
    pub async fn activity_feed(&self, viewer: DbId, board_id: DbId) -> StoreResult<Vec<Activity>> {
        let board = self.board_for(viewer, board_id).await?;
        self.store.list_activities(board.id, ACTIVITY_FEED_LIMIT).await
    }

    // ----- Profiles -----

    /// Create or refresh the caller's own profile.
    pub async fn upsert_profile(&self, user_id: DbId, mut input: NewUser) -> StoreResult<User> {
        if input.email.trim().is_empty() {
            return Err(CoreError::Validation("Email is required".into()).into());
        }
        input.id = user_id;
        self.store.upsert_user(input).await
    }

    pub async fn reward_summary(&self, user_id: DbId) -> StoreResult<RewardSummary> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
        Ok(RewardSummary::from(&user))
    }

    pub async fn notifications(&self, user_id: DbId) -> StoreResult<Vec<Notification>> {
        self.store.list_notifications(user_id).await
    }

    /// Not found unless the notification belongs to `user_id`.
    pub async fn mark_notification_read(&self, user_id: DbId, notification_id: DbId) -> StoreResult<()> {
        if !self
            .store
            .mark_notification_read(user_id, notification_id)
            .await?
        {
            return Err(CoreError::not_found("Notification", notification_id).into());
        }
        Ok(())
    }

    /// Returns how many notifications were unread.
    pub async fn mark_all_notifications_read(&self, user_id: DbId) -> StoreResult<u64> {
        let marked = self.store.mark_all_notifications_read(user_id).await?;
        tracing::debug!(user_id = %user_id, marked, "Notifications marked read");
        Ok(marked)
    }
}
