//! [`ProgressStore`] backed by Postgres through the repositories.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bingoals_core::error::CoreError;
use bingoals_core::types::{Day, DbId};

use super::{CompletionScope, ProgressStore, StoreResult};
use crate::models::{
    Activity, Board, BoardInvite, BoardMember, Comment, Goal, GoalMember, MiniGoal,
    MiniGoalMember, NewActivity, NewBoard, NewInvite, NewNotification, NewUser, Notification,
    Reaction, Reflection, User,
};
use crate::repositories::{
    ActivityRepo, BoardMemberRepo, BoardRepo, CommentRepo, GoalMemberRepo, GoalRepo, InviteRepo,
    MiniGoalMemberRepo, MiniGoalRepo, NotificationRepo, ReactionRepo, ReflectionRepo, UserRepo,
};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn upsert_user(&self, input: NewUser) -> StoreResult<User> {
        Ok(UserRepo::upsert(&self.pool, &input).await?)
    }

    async fn get_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_users(&self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(UserRepo::list_by_ids(&self.pool, ids).await?)
    }

    async fn accrue_rewards(&self, user_id: DbId, reward_delta: i64, today: Day) -> StoreResult<User> {
        UserRepo::accrue_rewards(&self.pool, user_id, reward_delta, today)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    async fn create_board(&self, input: NewBoard) -> StoreResult<Board> {
        Ok(BoardRepo::create(&self.pool, &input).await?)
    }

    async fn get_board(&self, id: DbId) -> StoreResult<Option<Board>> {
        Ok(BoardRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_boards_for_user(&self, user_id: DbId) -> StoreResult<Vec<Board>> {
        Ok(BoardRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn update_board(&self, board: &Board) -> StoreResult<Board> {
        BoardRepo::update(&self.pool, board)
            .await?
            .ok_or_else(|| CoreError::not_found("Board", board.id).into())
    }

    async fn delete_board(&self, id: DbId) -> StoreResult<bool> {
        Ok(BoardRepo::delete(&self.pool, id).await?)
    }

    async fn list_board_members(&self, board_id: DbId) -> StoreResult<Vec<BoardMember>> {
        Ok(BoardMemberRepo::list_by_board(&self.pool, board_id).await?)
    }

    async fn get_board_member(&self, board_id: DbId, user_id: DbId) -> StoreResult<Option<BoardMember>> {
        Ok(BoardMemberRepo::find(&self.pool, board_id, user_id).await?)
    }

    async fn add_board_member(&self, board_id: DbId, user_id: DbId, role: &str) -> StoreResult<BoardMember> {
        Ok(BoardMemberRepo::create(&self.pool, board_id, user_id, role).await?)
    }

    async fn remove_board_member(&self, board_id: DbId, user_id: DbId) -> StoreResult<bool> {
        Ok(BoardMemberRepo::delete(&self.pool, board_id, user_id).await?)
    }

    async fn create_invite(&self, input: NewInvite) -> StoreResult<BoardInvite> {
        Ok(InviteRepo::create(&self.pool, &input).await?)
    }

    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<BoardInvite>> {
        Ok(InviteRepo::find_by_code(&self.pool, code).await?)
    }

    async fn redeem_invite(&self, invite_id: DbId, user_id: DbId) -> StoreResult<Option<BoardMember>> {
        Ok(InviteRepo::redeem(&self.pool, invite_id, user_id).await?)
    }

    async fn get_goal(&self, id: DbId) -> StoreResult<Option<Goal>> {
        Ok(GoalRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_goal_at(&self, board_id: DbId, position: i32) -> StoreResult<Option<Goal>> {
        Ok(GoalRepo::find_by_position(&self.pool, board_id, position).await?)
    }

    async fn list_goals(&self, board_id: DbId) -> StoreResult<Vec<Goal>> {
        Ok(GoalRepo::list_by_board(&self.pool, board_id).await?)
    }

    async fn save_goal(&self, goal: &Goal) -> StoreResult<Goal> {
        Ok(GoalRepo::upsert(&self.pool, goal).await?)
    }

    async fn clear_goal(&self, reset: &Goal) -> StoreResult<Goal> {
        Ok(GoalRepo::clear(&self.pool, reset).await?)
    }

    async fn completed_positions(&self, board_id: DbId, scope: CompletionScope) -> StoreResult<HashSet<i32>> {
        let positions = match scope {
            CompletionScope::Canonical => GoalRepo::completed_positions(&self.pool, board_id).await?,
            CompletionScope::Member(user_id) => {
                GoalRepo::member_completed_positions(&self.pool, board_id, user_id).await?
            }
        };
        Ok(positions)
    }

    async fn get_mini_goal(&self, id: DbId) -> StoreResult<Option<MiniGoal>> {
        Ok(MiniGoalRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_mini_goals(&self, goal_ids: &[DbId]) -> StoreResult<Vec<MiniGoal>> {
        Ok(MiniGoalRepo::list_by_goals(&self.pool, goal_ids).await?)
    }

    async fn save_mini_goal(&self, mini: &MiniGoal) -> StoreResult<MiniGoal> {
        Ok(MiniGoalRepo::upsert(&self.pool, mini).await?)
    }

    async fn delete_mini_goal(&self, id: DbId) -> StoreResult<bool> {
        Ok(MiniGoalRepo::delete(&self.pool, id).await?)
    }

    async fn get_goal_member(&self, goal_id: DbId, user_id: DbId) -> StoreResult<Option<GoalMember>> {
        Ok(GoalMemberRepo::find(&self.pool, goal_id, user_id).await?)
    }

    async fn list_goal_members(&self, goal_ids: &[DbId], user_id: DbId) -> StoreResult<Vec<GoalMember>> {
        Ok(GoalMemberRepo::list_for_user(&self.pool, goal_ids, user_id).await?)
    }

    async fn list_goal_member_holders(&self, goal_id: DbId) -> StoreResult<Vec<GoalMember>> {
        Ok(GoalMemberRepo::list_by_goal(&self.pool, goal_id).await?)
    }

    async fn completed_member_counts(&self, goal_ids: &[DbId]) -> StoreResult<HashMap<DbId, i64>> {
        Ok(GoalMemberRepo::completed_counts(&self.pool, goal_ids).await?)
    }

    async fn save_goal_member(&self, member: &GoalMember) -> StoreResult<GoalMember> {
        Ok(GoalMemberRepo::upsert(&self.pool, member).await?)
    }

    async fn list_mini_goal_members(
        &self,
        mini_goal_ids: &[DbId],
        user_id: DbId,
    ) -> StoreResult<Vec<MiniGoalMember>> {
        Ok(MiniGoalMemberRepo::list_for_user(&self.pool, mini_goal_ids, user_id).await?)
    }

    async fn save_mini_goal_member(&self, member: &MiniGoalMember) -> StoreResult<MiniGoalMember> {
        Ok(MiniGoalMemberRepo::upsert(&self.pool, member).await?)
    }

    async fn get_reflection(&self, goal_id: DbId) -> StoreResult<Option<Reflection>> {
        Ok(ReflectionRepo::find_by_goal(&self.pool, goal_id).await?)
    }

    async fn ensure_reflection(&self, goal_id: DbId, prompt: &str) -> StoreResult<bool> {
        Ok(ReflectionRepo::create_blank(&self.pool, goal_id, prompt).await?)
    }

    async fn save_reflection(&self, reflection: &Reflection) -> StoreResult<Reflection> {
        Ok(ReflectionRepo::upsert(&self.pool, reflection).await?)
    }

    async fn create_comment(&self, goal_id: DbId, user_id: DbId, text: &str) -> StoreResult<Comment> {
        Ok(CommentRepo::create(&self.pool, goal_id, user_id, text).await?)
    }

    async fn get_comment(&self, id: DbId) -> StoreResult<Option<Comment>> {
        Ok(CommentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_comments(&self, goal_id: DbId) -> StoreResult<Vec<Comment>> {
        Ok(CommentRepo::list_by_goal(&self.pool, goal_id).await?)
    }

    async fn delete_comment(&self, id: DbId) -> StoreResult<bool> {
        Ok(CommentRepo::delete(&self.pool, id).await?)
    }

    async fn find_reaction(
        &self,
        goal_id: DbId,
        user_id: DbId,
        reaction_type: &str,
    ) -> StoreResult<Option<Reaction>> {
        Ok(ReactionRepo::find(&self.pool, goal_id, user_id, reaction_type).await?)
    }

    async fn create_reaction(&self, goal_id: DbId, user_id: DbId, reaction_type: &str) -> StoreResult<Reaction> {
        Ok(ReactionRepo::create(&self.pool, goal_id, user_id, reaction_type).await?)
    }

    async fn delete_reaction(&self, id: DbId) -> StoreResult<bool> {
        Ok(ReactionRepo::delete(&self.pool, id).await?)
    }

    async fn list_reactions(&self, goal_id: DbId) -> StoreResult<Vec<Reaction>> {
        Ok(ReactionRepo::list_by_goal(&self.pool, goal_id).await?)
    }

    async fn record_activity(&self, input: NewActivity) -> StoreResult<Activity> {
        Ok(ActivityRepo::create(&self.pool, &input).await?)
    }

    async fn list_activities(&self, board_id: DbId, limit: i64) -> StoreResult<Vec<Activity>> {
        Ok(ActivityRepo::list_by_board(&self.pool, board_id, limit).await?)
    }

    async fn create_notification(&self, input: NewNotification) -> StoreResult<Notification> {
        Ok(NotificationRepo::create(&self.pool, &input).await?)
    }

    async fn list_notifications(&self, user_id: DbId) -> StoreResult<Vec<Notification>> {
        Ok(NotificationRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn mark_notification_read(&self, user_id: DbId, id: DbId) -> StoreResult<bool> {
        Ok(NotificationRepo::mark_read(&self.pool, user_id, id).await?)
    }

    async fn mark_all_notifications_read(&self, user_id: DbId) -> StoreResult<u64> {
        Ok(NotificationRepo::mark_all_read(&self.pool, user_id).await?)
    }
}
