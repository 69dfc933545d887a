//! In-process [`ProgressStore`] used when no database is configured, and by
//! tests.
//!
//! All tables sit behind one `RwLock`, so every method is atomic with
//! respect to every other. Unique keys that Postgres enforces with
//! constraints are checked by hand and reported as [`CoreError::Conflict`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bingoals_core::board::member_roles;
use bingoals_core::error::CoreError;
use bingoals_core::types::{new_id, Day, DbId};
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CompletionScope, ProgressStore, StoreResult};
use crate::models::{
    Activity, Board, BoardInvite, BoardMember, Comment, Goal, GoalMember, MiniGoal,
    MiniGoalMember, NewActivity, NewBoard, NewInvite, NewNotification, NewUser, Notification,
    Reaction, Reflection, User,
};

#[derive(Default)]
struct Tables {
    users: HashMap<DbId, User>,
    boards: HashMap<DbId, Board>,
    board_members: Vec<BoardMember>,
    invites: Vec<BoardInvite>,
    goals: HashMap<DbId, Goal>,
    mini_goals: Vec<MiniGoal>,
    goal_members: HashMap<(DbId, DbId), GoalMember>,
    mini_goal_members: HashMap<(DbId, DbId), MiniGoalMember>,
    reflections: HashMap<DbId, Reflection>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
    activities: Vec<Activity>,
    notifications: Vec<Notification>,
}

impl Tables {
    /// Remove every row that hangs off the given goals.
    fn drop_goal_dependents(&mut self, goal_ids: &HashSet<DbId>) {
        let mini_ids: HashSet<DbId> = self
            .mini_goals
            .iter()
            .filter(|m| goal_ids.contains(&m.goal_id))
            .map(|m| m.id)
            .collect();
        self.mini_goals.retain(|m| !goal_ids.contains(&m.goal_id));
        self.mini_goal_members
            .retain(|(mini_id, _), _| !mini_ids.contains(mini_id));
        self.goal_members
            .retain(|(goal_id, _), _| !goal_ids.contains(goal_id));
        self.reflections
            .retain(|goal_id, _| !goal_ids.contains(goal_id));
    }
}

/// Lock-guarded in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert_user(&self, input: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users
            .values()
            .any(|u| u.email == input.email && u.id != input.id)
        {
            return Err(CoreError::Conflict(format!("Email {} is already in use", input.email)).into());
        }

        let now = Utc::now();
        let user = match t.users.get(&input.id) {
            Some(existing) => User {
                email: input.email,
                name: input.name,
                display_name: input.display_name,
                updated_at: now,
                ..existing.clone()
            },
            None => User {
                id: input.id,
                email: input.email,
                name: input.name,
                display_name: input.display_name,
                total_rewards: 0,
                daily_streak: 0,
                last_active_date: None,
                created_at: now,
                updated_at: now,
            },
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.users.get(id).cloned()).collect())
    }

    async fn accrue_rewards(&self, user_id: DbId, reward_delta: i64, today: Day) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .get_mut(&user_id)
            .ok_or_else(|| CoreError::not_found("User", user_id))?;

        let ledger = user.ledger().accrue(reward_delta, today);
        user.total_rewards = ledger.total_rewards;
        user.daily_streak = ledger.daily_streak;
        user.last_active_date = ledger.last_active_date;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_board(&self, input: NewBoard) -> StoreResult<Board> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let is_first = !t.boards.values().any(|b| b.user_id == input.user_id);

        let board = Board {
            id: new_id(),
            user_id: input.user_id,
            title: input.title,
            year: input.year,
            grid_size: input.grid_size.side(),
            board_type: input.board_type.as_str().to_string(),
            max_members: input.max_members,
            is_default: is_first,
            created_at: now,
            updated_at: now,
        };
        t.board_members.push(BoardMember {
            id: new_id(),
            board_id: board.id,
            user_id: board.user_id,
            role: member_roles::OWNER.to_string(),
            joined_at: now,
        });
        t.boards.insert(board.id, board.clone());
        Ok(board)
    }

    async fn get_board(&self, id: DbId) -> StoreResult<Option<Board>> {
        Ok(self.tables.read().await.boards.get(&id).cloned())
    }

    async fn list_boards_for_user(&self, user_id: DbId) -> StoreResult<Vec<Board>> {
        let t = self.tables.read().await;
        let joined: HashSet<DbId> = t
            .board_members
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.board_id)
            .collect();
        let mut boards: Vec<Board> = t
            .boards
            .values()
            .filter(|b| b.user_id == user_id || joined.contains(&b.id))
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(boards)
    }

    async fn update_board(&self, board: &Board) -> StoreResult<Board> {
        let mut t = self.tables.write().await;
        if !t.boards.contains_key(&board.id) {
            return Err(CoreError::not_found("Board", board.id).into());
        }

        let now = Utc::now();
        if board.is_default {
            for other in t
                .boards
                .values_mut()
                .filter(|b| b.user_id == board.user_id && b.id != board.id)
            {
                other.is_default = false;
            }
        }

        let stored = t
            .boards
            .get_mut(&board.id)
            .ok_or_else(|| CoreError::not_found("Board", board.id))?;
        stored.title = board.title.clone();
        stored.year = board.year;
        stored.max_members = board.max_members;
        stored.is_default = board.is_default;
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn delete_board(&self, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(board) = t.boards.remove(&id) else {
            return Ok(false);
        };

        let goal_ids: HashSet<DbId> = t
            .goals
            .values()
            .filter(|g| g.board_id == id)
            .map(|g| g.id)
            .collect();
        t.drop_goal_dependents(&goal_ids);
        t.goals.retain(|_, g| g.board_id != id);
        t.comments.retain(|c| !goal_ids.contains(&c.goal_id));
        t.reactions.retain(|r| !goal_ids.contains(&r.goal_id));
        t.board_members.retain(|m| m.board_id != id);
        t.invites.retain(|i| i.board_id != id);
        t.activities.retain(|a| a.board_id != id);

        if board.is_default {
            if let Some(next) = t
                .boards
                .values_mut()
                .filter(|b| b.user_id == board.user_id)
                .max_by_key(|b| b.created_at)
            {
                next.is_default = true;
            }
        }
        Ok(true)
    }

    async fn list_board_members(&self, board_id: DbId) -> StoreResult<Vec<BoardMember>> {
        let t = self.tables.read().await;
        Ok(t.board_members
            .iter()
            .filter(|m| m.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn get_board_member(&self, board_id: DbId, user_id: DbId) -> StoreResult<Option<BoardMember>> {
        let t = self.tables.read().await;
        Ok(t.board_members
            .iter()
            .find(|m| m.board_id == board_id && m.user_id == user_id)
            .cloned())
    }

    async fn add_board_member(&self, board_id: DbId, user_id: DbId, role: &str) -> StoreResult<BoardMember> {
        let mut t = self.tables.write().await;
        if !t.boards.contains_key(&board_id) {
            return Err(CoreError::not_found("Board", board_id).into());
        }
        if t
            .board_members
            .iter()
            .any(|m| m.board_id == board_id && m.user_id == user_id)
        {
            return Err(CoreError::Conflict("User is already a member of this board".into()).into());
        }

        let member = BoardMember {
            id: new_id(),
            board_id,
            user_id,
            role: role.to_string(),
            joined_at: Utc::now(),
        };
        t.board_members.push(member.clone());
        Ok(member)
    }

    async fn remove_board_member(&self, board_id: DbId, user_id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.board_members.len();
        t.board_members
            .retain(|m| !(m.board_id == board_id && m.user_id == user_id));
        Ok(t.board_members.len() < before)
    }

    async fn create_invite(&self, input: NewInvite) -> StoreResult<BoardInvite> {
        let mut t = self.tables.write().await;
        if !t.boards.contains_key(&input.board_id) {
            return Err(CoreError::not_found("Board", input.board_id).into());
        }
        if t.invites.iter().any(|i| i.invite_code == input.invite_code) {
            return Err(CoreError::Conflict("Invite code already in use".into()).into());
        }
        let invite = BoardInvite {
            id: new_id(),
            board_id: input.board_id,
            inviter_id: input.inviter_id,
            invite_code: input.invite_code,
            expires_at: input.expires_at,
            max_uses: input.max_uses,
            used_count: 0,
            created_at: Utc::now(),
        };
        t.invites.push(invite.clone());
        Ok(invite)
    }

    async fn find_invite_by_code(&self, code: &str) -> StoreResult<Option<BoardInvite>> {
        let t = self.tables.read().await;
        Ok(t.invites.iter().find(|i| i.invite_code == code).cloned())
    }

    async fn redeem_invite(&self, invite_id: DbId, user_id: DbId) -> StoreResult<Option<BoardMember>> {
        let mut t = self.tables.write().await;
        let Some(invite) = t.invites.iter().find(|i| i.id == invite_id).cloned() else {
            return Err(CoreError::not_found("BoardInvite", invite_id).into());
        };
        if invite.max_uses > 0 && invite.used_count >= invite.max_uses {
            return Ok(None);
        }
        if t
            .board_members
            .iter()
            .any(|m| m.board_id == invite.board_id && m.user_id == user_id)
        {
            return Err(CoreError::Conflict("User is already a member of this board".into()).into());
        }

        let member = BoardMember {
            id: new_id(),
            board_id: invite.board_id,
            user_id,
            role: member_roles::MEMBER.to_string(),
            joined_at: Utc::now(),
        };
        t.board_members.push(member.clone());
        if let Some(stored) = t.invites.iter_mut().find(|i| i.id == invite_id) {
            stored.used_count += 1;
        }
        Ok(Some(member))
    }

    async fn get_goal(&self, id: DbId) -> StoreResult<Option<Goal>> {
        Ok(self.tables.read().await.goals.get(&id).cloned())
    }

    async fn find_goal_at(&self, board_id: DbId, position: i32) -> StoreResult<Option<Goal>> {
        let t = self.tables.read().await;
        Ok(t.goals
            .values()
            .find(|g| g.board_id == board_id && g.position == position)
            .cloned())
    }

    async fn list_goals(&self, board_id: DbId) -> StoreResult<Vec<Goal>> {
        let t = self.tables.read().await;
        let mut goals: Vec<Goal> = t
            .goals
            .values()
            .filter(|g| g.board_id == board_id)
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.position);
        Ok(goals)
    }

    async fn save_goal(&self, goal: &Goal) -> StoreResult<Goal> {
        let mut t = self.tables.write().await;
        if !t.boards.contains_key(&goal.board_id) {
            return Err(CoreError::not_found("Board", goal.board_id).into());
        }
        if t.goals
            .values()
            .any(|g| g.board_id == goal.board_id && g.position == goal.position && g.id != goal.id)
        {
            return Err(CoreError::Conflict(format!(
                "A goal already exists at position {}",
                goal.position
            ))
            .into());
        }
        t.goals.insert(goal.id, goal.clone());
        Ok(goal.clone())
    }

    async fn clear_goal(&self, reset: &Goal) -> StoreResult<Goal> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&reset.id) {
            return Err(CoreError::not_found("Goal", reset.id).into());
        }
        t.drop_goal_dependents(&HashSet::from([reset.id]));
        t.goals.insert(reset.id, reset.clone());
        Ok(reset.clone())
    }

    async fn completed_positions(&self, board_id: DbId, scope: CompletionScope) -> StoreResult<HashSet<i32>> {
        let t = self.tables.read().await;
        let on_board = t.goals.values().filter(|g| g.board_id == board_id);
        let positions = match scope {
            CompletionScope::Canonical => on_board
                .filter(|g| g.is_completed)
                .map(|g| g.position)
                .collect(),
            CompletionScope::Member(user_id) => on_board
                .filter(|g| {
                    t.goal_members
                        .get(&(g.id, user_id))
                        .is_some_and(|m| m.is_completed)
                })
                .map(|g| g.position)
                .collect(),
        };
        Ok(positions)
    }

    async fn get_mini_goal(&self, id: DbId) -> StoreResult<Option<MiniGoal>> {
        let t = self.tables.read().await;
        Ok(t.mini_goals.iter().find(|m| m.id == id).cloned())
    }

    async fn list_mini_goals(&self, goal_ids: &[DbId]) -> StoreResult<Vec<MiniGoal>> {
        let t = self.tables.read().await;
        Ok(t.mini_goals
            .iter()
            .filter(|m| goal_ids.contains(&m.goal_id))
            .cloned()
            .collect())
    }

    async fn save_mini_goal(&self, mini: &MiniGoal) -> StoreResult<MiniGoal> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&mini.goal_id) {
            return Err(CoreError::not_found("Goal", mini.goal_id).into());
        }
        match t.mini_goals.iter_mut().find(|m| m.id == mini.id) {
            Some(existing) => *existing = mini.clone(),
            None => t.mini_goals.push(mini.clone()),
        }
        Ok(mini.clone())
    }

    async fn delete_mini_goal(&self, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.mini_goals.len();
        t.mini_goals.retain(|m| m.id != id);
        t.mini_goal_members.retain(|(mini_id, _), _| *mini_id != id);
        Ok(t.mini_goals.len() < before)
    }

    async fn get_goal_member(&self, goal_id: DbId, user_id: DbId) -> StoreResult<Option<GoalMember>> {
        let t = self.tables.read().await;
        Ok(t.goal_members.get(&(goal_id, user_id)).cloned())
    }

    async fn list_goal_members(&self, goal_ids: &[DbId], user_id: DbId) -> StoreResult<Vec<GoalMember>> {
        let t = self.tables.read().await;
        Ok(goal_ids
            .iter()
            .filter_map(|goal_id| t.goal_members.get(&(*goal_id, user_id)).cloned())
            .collect())
    }

    async fn list_goal_member_holders(&self, goal_id: DbId) -> StoreResult<Vec<GoalMember>> {
        let t = self.tables.read().await;
        Ok(t.goal_members
            .values()
            .filter(|m| m.goal_id == goal_id)
            .cloned()
            .collect())
    }

    async fn completed_member_counts(&self, goal_ids: &[DbId]) -> StoreResult<HashMap<DbId, i64>> {
        let t = self.tables.read().await;
        let mut counts = HashMap::new();
        for member in t
            .goal_members
            .values()
            .filter(|m| m.is_completed && goal_ids.contains(&m.goal_id))
        {
            *counts.entry(member.goal_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn save_goal_member(&self, member: &GoalMember) -> StoreResult<GoalMember> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&member.goal_id) {
            return Err(CoreError::not_found("Goal", member.goal_id).into());
        }
        let key = (member.goal_id, member.user_id);
        let saved = match t.goal_members.get(&key) {
            Some(existing) => GoalMember {
                id: existing.id,
                created_at: existing.created_at,
                ..member.clone()
            },
            None => member.clone(),
        };
        t.goal_members.insert(key, saved.clone());
        Ok(saved)
    }

    async fn list_mini_goal_members(
        &self,
        mini_goal_ids: &[DbId],
        user_id: DbId,
    ) -> StoreResult<Vec<MiniGoalMember>> {
        let t = self.tables.read().await;
        Ok(mini_goal_ids
            .iter()
            .filter_map(|mini_id| t.mini_goal_members.get(&(*mini_id, user_id)).cloned())
            .collect())
    }

    async fn save_mini_goal_member(&self, member: &MiniGoalMember) -> StoreResult<MiniGoalMember> {
        let mut t = self.tables.write().await;
        if !t.mini_goals.iter().any(|m| m.id == member.mini_goal_id) {
            return Err(CoreError::not_found("MiniGoal", member.mini_goal_id).into());
        }
        let key = (member.mini_goal_id, member.user_id);
        let saved = match t.mini_goal_members.get(&key) {
            Some(existing) => MiniGoalMember {
                id: existing.id,
                created_at: existing.created_at,
                ..member.clone()
            },
            None => member.clone(),
        };
        t.mini_goal_members.insert(key, saved.clone());
        Ok(saved)
    }

    async fn get_reflection(&self, goal_id: DbId) -> StoreResult<Option<Reflection>> {
        Ok(self.tables.read().await.reflections.get(&goal_id).cloned())
    }

    async fn ensure_reflection(&self, goal_id: DbId, prompt: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&goal_id) {
            return Err(CoreError::not_found("Goal", goal_id).into());
        }
        if t.reflections.contains_key(&goal_id) {
            return Ok(false);
        }
        t.reflections
            .insert(goal_id, Reflection::blank(goal_id, prompt, Utc::now()));
        Ok(true)
    }

    async fn save_reflection(&self, reflection: &Reflection) -> StoreResult<Reflection> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&reflection.goal_id) {
            return Err(CoreError::not_found("Goal", reflection.goal_id).into());
        }
        let now = Utc::now();
        let saved = match t.reflections.get(&reflection.goal_id) {
            Some(existing) => Reflection {
                id: existing.id,
                created_at: existing.created_at,
                updated_at: now,
                ..reflection.clone()
            },
            None => Reflection {
                updated_at: now,
                ..reflection.clone()
            },
        };
        t.reflections.insert(saved.goal_id, saved.clone());
        Ok(saved)
    }

    async fn create_comment(&self, goal_id: DbId, user_id: DbId, text: &str) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&goal_id) {
            return Err(CoreError::not_found("Goal", goal_id).into());
        }
        let comment = Comment {
            id: new_id(),
            goal_id,
            user_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: DbId) -> StoreResult<Option<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, goal_id: DbId) -> StoreResult<Vec<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments
            .iter()
            .filter(|c| c.goal_id == goal_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.comments.len();
        t.comments.retain(|c| c.id != id);
        Ok(t.comments.len() < before)
    }

    async fn find_reaction(
        &self,
        goal_id: DbId,
        user_id: DbId,
        reaction_type: &str,
    ) -> StoreResult<Option<Reaction>> {
        let t = self.tables.read().await;
        Ok(t.reactions
            .iter()
            .find(|r| r.goal_id == goal_id && r.user_id == user_id && r.reaction_type == reaction_type)
            .cloned())
    }

    async fn create_reaction(&self, goal_id: DbId, user_id: DbId, reaction_type: &str) -> StoreResult<Reaction> {
        let mut t = self.tables.write().await;
        if !t.goals.contains_key(&goal_id) {
            return Err(CoreError::not_found("Goal", goal_id).into());
        }
        if t
            .reactions
            .iter()
            .any(|r| r.goal_id == goal_id && r.user_id == user_id && r.reaction_type == reaction_type)
        {
            return Err(CoreError::Conflict("Reaction already exists".into()).into());
        }
        let reaction = Reaction {
            id: new_id(),
            goal_id,
            user_id,
            reaction_type: reaction_type.to_string(),
            created_at: Utc::now(),
        };
        t.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn delete_reaction(&self, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.reactions.len();
        t.reactions.retain(|r| r.id != id);
        Ok(t.reactions.len() < before)
    }

    async fn list_reactions(&self, goal_id: DbId) -> StoreResult<Vec<Reaction>> {
        let t = self.tables.read().await;
        Ok(t.reactions
            .iter()
            .filter(|r| r.goal_id == goal_id)
            .cloned()
            .collect())
    }

    async fn record_activity(&self, input: NewActivity) -> StoreResult<Activity> {
        let activity = Activity {
            id: new_id(),
            board_id: input.board_id,
            user_id: input.user_id,
            action_type: input.action_type.to_string(),
            target_id: input.target_id,
            metadata: input.metadata,
            created_at: Utc::now(),
        };
        self.tables.write().await.activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_activities(&self, board_id: DbId, limit: i64) -> StoreResult<Vec<Activity>> {
        let t = self.tables.read().await;
        Ok(t.activities
            .iter()
            .rev()
            .filter(|a| a.board_id == board_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn create_notification(&self, input: NewNotification) -> StoreResult<Notification> {
        let notification = Notification {
            id: new_id(),
            user_id: input.user_id,
            notification_type: input.notification_type,
            title: input.title,
            body: input.body,
            is_read: false,
            metadata: input.metadata,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, user_id: DbId) -> StoreResult<Vec<Notification>> {
        let t = self.tables.read().await;
        Ok(t.notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, user_id: DbId, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        match t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: DbId) -> StoreResult<u64> {
        let mut t = self.tables.write().await;
        let mut marked = 0;
        for notification in t
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
