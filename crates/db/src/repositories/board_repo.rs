//! Repositories for the `boards` and `board_members` tables.

use bingoals_core::board::member_roles;
use bingoals_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::board::{Board, BoardMember, NewBoard};

// ---------------------------------------------------------------------------
// BoardRepo
// ---------------------------------------------------------------------------

/// Column list for `boards` queries.
const BOARD_COLUMNS: &str = "id, user_id, title, year, grid_size, board_type, max_members, \
                             is_default, created_at, updated_at";

/// Provides CRUD operations for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// Insert a board together with its owner membership row.
    ///
    /// The first board a user creates becomes their default.
    pub async fn create(pool: &PgPool, input: &NewBoard) -> Result<Board, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards WHERE user_id = $1")
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO boards (id, user_id, title, year, grid_size, board_type, max_members, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {BOARD_COLUMNS}"
        );
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(new_id())
            .bind(input.user_id)
            .bind(&input.title)
            .bind(input.year)
            .bind(input.grid_size.side())
            .bind(input.board_type.as_str())
            .bind(input.max_members)
            .bind(existing == 0)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO board_members (id, board_id, user_id, role) VALUES ($1, $2, $3, $4)",
        )
        .bind(new_id())
        .bind(board.id)
        .bind(board.user_id)
        .bind(member_roles::OWNER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(board)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist the mutable fields of a board. When the board is the default,
    /// the flag is cleared on the owner's other boards in the same
    /// transaction.
    pub async fn update(pool: &PgPool, board: &Board) -> Result<Option<Board>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if board.is_default {
            sqlx::query("UPDATE boards SET is_default = false WHERE user_id = $1 AND id <> $2")
                .bind(board.user_id)
                .bind(board.id)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "UPDATE boards SET title = $2, year = $3, max_members = $4, is_default = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BOARD_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Board>(&query)
            .bind(board.id)
            .bind(&board.title)
            .bind(board.year)
            .bind(board.max_members)
            .bind(board.is_default)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a board. Dependent rows go with it through `ON DELETE CASCADE`.
    /// If it was the owner's default, their most recent remaining board
    /// takes the flag.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted: Option<(DbId, bool)> =
            sqlx::query_as("DELETE FROM boards WHERE id = $1 RETURNING user_id, is_default")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((owner, was_default)) = deleted else {
            return Ok(false);
        };

        if was_default {
            let reassigned = sqlx::query(
                "UPDATE boards SET is_default = true, updated_at = NOW() \
                 WHERE id = (SELECT id FROM boards WHERE user_id = $1 \
                             ORDER BY created_at DESC LIMIT 1)",
            )
            .bind(owner)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(
                board_id = %id,
                user_id = %owner,
                reassigned = reassigned.rows_affected() > 0,
                "Default board deleted"
            );
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Boards `user_id` owns or belongs to, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Board>, sqlx::Error> {
        let query = format!(
            "SELECT {BOARD_COLUMNS} FROM boards \
             WHERE user_id = $1 \
                OR id IN (SELECT board_id FROM board_members WHERE user_id = $1) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// BoardMemberRepo
// ---------------------------------------------------------------------------

/// Column list for `board_members` queries.
const MEMBER_COLUMNS: &str = "id, board_id, user_id, role, joined_at";

/// Provides membership operations for boards.
pub struct BoardMemberRepo;

impl BoardMemberRepo {
    /// Add a member. A duplicate (board, user) pair fails with the
    /// `uq_board_members_board_user` unique violation.
    pub async fn create(
        pool: &PgPool,
        board_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<BoardMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO board_members (id, board_id, user_id, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, BoardMember>(&query)
            .bind(new_id())
            .bind(board_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        board_id: DbId,
        user_id: DbId,
    ) -> Result<Option<BoardMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM board_members WHERE board_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, BoardMember>(&query)
            .bind(board_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Members of a board, earliest joiner first.
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<BoardMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM board_members WHERE board_id = $1 ORDER BY joined_at"
        );
        sqlx::query_as::<_, BoardMember>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, board_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
