//! Repository for the `board_invites` table.

use bingoals_core::board::member_roles;
use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::board::BoardMember;
use crate::models::invite::{BoardInvite, NewInvite};

/// Column list for `board_invites` queries.
const COLUMNS: &str = "id, board_id, inviter_id, invite_code, expires_at, max_uses, \
                       used_count, created_at";

pub struct InviteRepo;

impl InviteRepo {
    /// A clashing code fails with the `uq_board_invites_code` unique
    /// violation.
    pub async fn create(pool: &PgPool, input: &NewInvite) -> Result<BoardInvite, sqlx::Error> {
        let query = format!(
            "INSERT INTO board_invites (id, board_id, inviter_id, invite_code, expires_at, max_uses) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardInvite>(&query)
            .bind(new_id())
            .bind(input.board_id)
            .bind(input.inviter_id)
            .bind(&input.invite_code)
            .bind(input.expires_at)
            .bind(input.max_uses)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<BoardInvite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM board_invites WHERE invite_code = $1");
        sqlx::query_as::<_, BoardInvite>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Take one use of the invite and insert the membership in the same
    /// transaction. Returns `None`, with nothing written, when the use
    /// limit has already been reached.
    pub async fn redeem(
        pool: &PgPool,
        invite_id: DbId,
        user_id: DbId,
    ) -> Result<Option<BoardMember>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE board_invites SET used_count = used_count + 1 \
             WHERE id = $1 AND (max_uses = 0 OR used_count < max_uses) \
             RETURNING board_id",
        )
        .bind(invite_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(board_id) = board_id else {
            tracing::debug!(invite_id = %invite_id, "Invite use limit reached");
            return Ok(None);
        };

        let member = sqlx::query_as::<_, BoardMember>(
            "INSERT INTO board_members (id, board_id, user_id, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, board_id, user_id, role, joined_at",
        )
        .bind(new_id())
        .bind(board_id)
        .bind(user_id)
        .bind(member_roles::MEMBER)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(invite_id = %invite_id, board_id = %board_id, user_id = %user_id, "Invite redeemed");
        Ok(Some(member))
    }
}
