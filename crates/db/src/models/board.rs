//! Board and board membership models.

use bingoals_core::board::{member_roles, BoardType, GridSize};
use bingoals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A row from the `boards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub year: i32,
    pub grid_size: i32,
    pub board_type: String,
    pub max_members: i32,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Board {
    pub fn grid(&self) -> GridSize {
        GridSize::from_requested(self.grid_size)
    }

    /// Board kind. Unknown stored values read as personal.
    pub fn kind(&self) -> BoardType {
        BoardType::parse_lenient(&self.board_type)
    }

    pub fn is_owner(&self, user_id: DbId) -> bool {
        self.user_id == user_id
    }
}

/// Normalised input for inserting a board.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub user_id: DbId,
    pub title: String,
    pub year: i32,
    pub grid_size: GridSize,
    pub board_type: BoardType,
    pub max_members: i32,
}

// ---------------------------------------------------------------------------
// BoardMember
// ---------------------------------------------------------------------------

/// A row from the `board_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub id: DbId,
    pub board_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub joined_at: Timestamp,
}

impl BoardMember {
    pub fn is_owner(&self) -> bool {
        self.role == member_roles::OWNER
    }
}
