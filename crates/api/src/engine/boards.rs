//! Board lifecycle and membership.

use std::collections::HashMap;

use bingoals_core::board::{
    member_roles, normalize_max_members, validate_board_title, BoardType, GridSize,
};
use bingoals_core::error::CoreError;
use bingoals_core::invite;
use bingoals_core::realtime::{BoardEvent, BoardEventType};
use bingoals_core::types::{DbId, Timestamp};
use bingoals_db::models::{
    action_types, Board, BoardInvite, BoardMember, NewActivity, NewBoard, NewInvite,
};
use bingoals_db::{StoreError, StoreResult};
use bingoals_events::{event_types, Notice, PlatformEvent};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::resolver::{GoalView, ProgressResolver};
use super::{notice_kinds, CollaborationEngine};

/// Request body for creating a board. Out-of-range values are normalised,
/// not rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub title: String,
    pub year: Option<i32>,
    pub grid_size: Option<i32>,
    pub board_type: Option<String>,
    pub max_members: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub title: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    pub user_id: DbId,
}

/// Invite options. `maxUses` of zero or less is unlimited; `expiresIn`
/// (hours) of zero or less never expires.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvite {
    pub max_uses: Option<i32>,
    pub expires_in: Option<i64>,
}

/// One entry of the caller's board list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    #[serde(flatten)]
    pub board: Board,
    /// Cells with a title.
    pub goal_count: usize,
    /// Cells the viewer has completed, ascending.
    pub completed_positions: Vec<i32>,
    pub completed_count: usize,
    pub member_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub user_id: DbId,
    pub name: String,
    pub role: String,
    pub joined_at: Timestamp,
}

/// A board as one viewer sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub goals: Vec<GoalView>,
    pub members: Vec<BoardMember>,
}

impl CollaborationEngine {
    pub async fn create_board(&self, owner: DbId, input: CreateBoard) -> StoreResult<Board> {
        let title = validate_board_title(&input.title)?;
        let board_type = input
            .board_type
            .as_deref()
            .map_or(BoardType::Personal, BoardType::parse_lenient);

        let board = self
            .store
            .create_board(NewBoard {
                user_id: owner,
                title,
                year: input.year.unwrap_or_else(|| chrono::Utc::now().year()),
                grid_size: GridSize::from_requested(input.grid_size.unwrap_or_default()),
                board_type,
                max_members: normalize_max_members(input.max_members),
            })
            .await?;

        tracing::info!(
            board_id = %board.id,
            user_id = %owner,
            grid_size = board.grid_size,
            board_type = %board.board_type,
            "Board created"
        );
        Ok(board)
    }

    /// Board, every goal resolved for `viewer`, and the member list.
    pub async fn board_view(&self, viewer: DbId, board_id: DbId) -> StoreResult<BoardView> {
        let board = self.board_for(viewer, board_id).await?;
        let goals = self.store.list_goals(board.id).await?;
        let goals = ProgressResolver::for_board(&board)
            .effective_status_batch(self.store(), &goals, viewer)
            .await?;
        let members = self.store.list_board_members(board.id).await?;
        Ok(BoardView {
            board,
            goals,
            members,
        })
    }

    pub async fn update_board(
        &self,
        actor: DbId,
        board_id: DbId,
        input: UpdateBoard,
    ) -> StoreResult<Board> {
        let mut board = self.owned_board(actor, board_id).await?;
        if let Some(title) = input.title {
            board.title = validate_board_title(&title)?;
        }
        if let Some(is_default) = input.is_default {
            board.is_default = is_default;
        }
        self.store.update_board(&board).await
    }

    pub async fn delete_board(&self, actor: DbId, board_id: DbId) -> StoreResult<()> {
        let board = self.owned_board(actor, board_id).await?;
        if !self.store.delete_board(board.id).await? {
            return Err(CoreError::not_found("Board", board_id).into());
        }
        tracing::info!(board_id = %board_id, user_id = %actor, "Board deleted");
        Ok(())
    }

    /// Owner adds a user to a shared board.
    pub async fn add_member(
        &self,
        actor: DbId,
        board_id: DbId,
        input: AddMember,
    ) -> StoreResult<BoardMember> {
        let board = self.owned_board(actor, board_id).await?;
        require_shared(&board)?;
        if self.store.get_user(input.user_id).await?.is_none() {
            return Err(CoreError::not_found("User", input.user_id).into());
        }
        self.check_admission(&board, input.user_id).await?;

        let member = self
            .store
            .add_board_member(board.id, input.user_id, member_roles::MEMBER)
            .await?;
        self.announce_member(&board, &member).await;

        tracing::info!(board_id = %board.id, user_id = %input.user_id, "Member added");
        Ok(member)
    }

    /// Owner issues an invite code for a shared board.
    pub async fn create_invite(
        &self,
        actor: DbId,
        board_id: DbId,
        input: CreateInvite,
    ) -> StoreResult<BoardInvite> {
        let board = self.owned_board(actor, board_id).await?;
        require_shared(&board)?;

        let invite = self
            .store
            .create_invite(NewInvite {
                board_id: board.id,
                inviter_id: actor,
                invite_code: invite::generate_code(),
                expires_at: invite::expiry_from_hours(Utc::now(), input.expires_in.unwrap_or(0)),
                max_uses: invite::normalize_max_uses(input.max_uses),
            })
            .await?;

        tracing::info!(
            board_id = %board.id,
            invite_id = %invite.id,
            max_uses = invite.max_uses,
            expires_at = ?invite.expires_at,
            "Invite created"
        );
        Ok(invite)
    }

    /// Redeem an invite code. Unknown codes are not found; expired or used
    /// up codes are gone. Admission follows the same rules as a direct add.
    pub async fn join_board(&self, user_id: DbId, code: &str) -> StoreResult<BoardMember> {
        let code = code.trim();
        let invite = self
            .store
            .find_invite_by_code(code)
            .await?
            .ok_or_else(|| CoreError::not_found("BoardInvite", code))?;
        if !invite.is_redeemable(Utc::now()) {
            return Err(invite_gone());
        }

        let board = self
            .store
            .get_board(invite.board_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Board", invite.board_id))?;
        if self.store.get_user(user_id).await?.is_none() {
            return Err(CoreError::not_found("User", user_id).into());
        }
        self.check_admission(&board, user_id).await?;

        let member = self
            .store
            .redeem_invite(invite.id, user_id)
            .await?
            .ok_or_else(invite_gone)?;
        self.announce_member(&board, &member).await;

        tracing::info!(board_id = %board.id, user_id = %user_id, invite_id = %invite.id, "Joined via invite");
        Ok(member)
    }

    /// Already-member and capacity checks. The owner counts toward the limit.
    async fn check_admission(&self, board: &Board, user_id: DbId) -> StoreResult<()> {
        let members = self.store.list_board_members(board.id).await?;
        if members.iter().any(|m| m.user_id == user_id) {
            return Err(CoreError::Conflict("User is already a member of this board".into()).into());
        }
        if members.len() >= usize::try_from(board.max_members).unwrap_or(0) {
            return Err(CoreError::Conflict(format!(
                "Board is full ({} members)",
                board.max_members
            ))
            .into());
        }
        Ok(())
    }

    /// Feed entry, realtime event and notices for a new member.
    async fn announce_member(&self, board: &Board, member: &BoardMember) {
        let name = self.display_name(member.user_id).await;

        self.record_activity(board, NewActivity {
            board_id: board.id,
            user_id: member.user_id,
            action_type: action_types::MEMBER_JOINED,
            target_id: None,
            metadata: Some(json!({ "userName": name })),
        })
        .await;

        self.broadcast(
            board,
            member.user_id,
            BoardEvent::new(BoardEventType::MemberJoined, board.id, member.user_id)
                .with_data(json!({ "userName": name })),
        )
        .await;

        self.notify(
            board,
            member.user_id,
            PlatformEvent::new(event_types::MEMBER_JOINED),
            Notice::new(
                notice_kinds::MEMBER_JOINED,
                "New member",
                format!("{name} joined {}", board.title),
            )
            .with_metadata(json!({ "boardId": board.id, "userId": member.user_id })),
        );
    }

    /// Every board the viewer owns or belongs to, newest first, with
    /// counts resolved for the viewer.
    pub async fn list_boards(&self, viewer: DbId) -> StoreResult<Vec<BoardSummary>> {
        let boards = self.store.list_boards_for_user(viewer).await?;
        let mut summaries = Vec::with_capacity(boards.len());
        for board in boards {
            let goal_count = self
                .store
                .list_goals(board.id)
                .await?
                .iter()
                .filter(|g| g.title.is_some())
                .count();
            let scope = ProgressResolver::for_board(&board).completion_scope(viewer);
            let mut completed_positions: Vec<i32> = self
                .store
                .completed_positions(board.id, scope)
                .await?
                .into_iter()
                .collect();
            completed_positions.sort_unstable();
            let member_count = self.store.list_board_members(board.id).await?.len();

            summaries.push(BoardSummary {
                board,
                goal_count,
                completed_count: completed_positions.len(),
                completed_positions,
                member_count,
            });
        }
        Ok(summaries)
    }

    /// Members with their display names, earliest joiner first.
    pub async fn list_members(&self, viewer: DbId, board_id: DbId) -> StoreResult<Vec<MemberInfo>> {
        let board = self.board_for(viewer, board_id).await?;
        let mut members = self.store.list_board_members(board.id).await?;
        members.sort_by_key(|m| m.joined_at);

        let ids: Vec<DbId> = members.iter().map(|m| m.user_id).collect();
        let names: HashMap<DbId, String> = self
            .store
            .list_users(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.label().to_string()))
            .collect();

        Ok(members
            .into_iter()
            .map(|m| MemberInfo {
                name: names
                    .get(&m.user_id)
                    .cloned()
                    .unwrap_or_else(|| "Someone".to_string()),
                user_id: m.user_id,
                role: m.role,
                joined_at: m.joined_at,
            })
            .collect())
    }

    /// Remove a member. The owner may remove anyone but themselves; any
    /// other member may only remove themselves.
    pub async fn remove_member(&self, actor: DbId, board_id: DbId, user_id: DbId) -> StoreResult<()> {
        let board = self.board_for(actor, board_id).await?;
        if board.is_owner(user_id) {
            return Err(CoreError::Validation("The board owner cannot leave the board".into()).into());
        }
        if !board.is_owner(actor) && actor != user_id {
            return Err(CoreError::Forbidden("Only the board owner can remove other members".into()).into());
        }
        if !self.store.remove_board_member(board.id, user_id).await? {
            return Err(CoreError::not_found("BoardMember", user_id).into());
        }

        self.record_activity(&board, NewActivity {
            board_id: board.id,
            user_id,
            action_type: action_types::MEMBER_LEFT,
            target_id: None,
            metadata: None,
        })
        .await;

        self.broadcast(
            &board,
            actor,
            BoardEvent::new(BoardEventType::MemberLeft, board.id, user_id),
        )
        .await;
        let evicted = self.hub.evict_user(board.id, user_id).await;

        tracing::info!(board_id = %board.id, user_id = %user_id, actor = %actor, evicted, "Member removed");
        Ok(())
    }
}

fn require_shared(board: &Board) -> StoreResult<()> {
    if board.kind().is_shared() {
        Ok(())
    } else {
        Err(CoreError::Validation("Only shared boards can have members".into()).into())
    }
}

fn invite_gone() -> StoreError {
    CoreError::Gone("This invite has expired or reached its usage limit".into()).into()
}
