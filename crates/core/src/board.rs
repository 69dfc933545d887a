//! Board geometry, board kinds and membership roles.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Member limit applied when a board is created without one.
pub const DEFAULT_MAX_MEMBERS: i32 = 5;

/// Board kinds as stored in the `boards.board_type` column.
pub mod board_types {
    pub const PERSONAL: &str = "personal";
    pub const SHARED: &str = "shared";
}

/// Membership roles as stored in the `board_members.role` column.
pub mod member_roles {
    pub const OWNER: &str = "owner";
    pub const MEMBER: &str = "member";
}

// ---------------------------------------------------------------------------
// GridSize
// ---------------------------------------------------------------------------

/// Side length of a square board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum GridSize {
    Three,
    Five,
    Seven,
}

impl GridSize {
    /// Normalise a requested side length. Anything other than 3 or 7 becomes
    /// the default 5x5 board.
    pub fn from_requested(side: i32) -> Self {
        match side {
            3 => Self::Three,
            7 => Self::Seven,
            _ => Self::Five,
        }
    }

    pub fn side(self) -> i32 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
            Self::Seven => 7,
        }
    }

    /// Number of addressable positions, `side²`.
    pub fn cells(self) -> i32 {
        self.side() * self.side()
    }

    /// Check that `position` addresses a cell of this grid.
    pub fn validate_position(self, position: i32) -> Result<i32, CoreError> {
        if (0..self.cells()).contains(&position) {
            Ok(position)
        } else {
            Err(CoreError::InvalidPosition {
                position,
                grid_size: self.side(),
            })
        }
    }

    /// `(row, col)` of a position.
    pub fn coordinates(self, position: i32) -> (i32, i32) {
        (position / self.side(), position % self.side())
    }
}

impl TryFrom<i32> for GridSize {
    type Error = String;

    fn try_from(side: i32) -> Result<Self, Self::Error> {
        match side {
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            7 => Ok(Self::Seven),
            other => Err(format!("Unsupported grid size {other}, expected 3, 5 or 7")),
        }
    }
}

impl From<GridSize> for i32 {
    fn from(size: GridSize) -> Self {
        size.side()
    }
}

// ---------------------------------------------------------------------------
// BoardType
// ---------------------------------------------------------------------------

/// Whether completion state is tracked once per goal or once per member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    Personal,
    Shared,
}

impl BoardType {
    /// Parse a stored board type. Unknown values fall back to
    /// [`BoardType::Personal`] so that reads never fail on bad data.
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            board_types::SHARED => Self::Shared,
            _ => Self::Personal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => board_types::PERSONAL,
            Self::Shared => board_types::SHARED,
        }
    }

    pub fn is_shared(self) -> bool {
        self == Self::Shared
    }
}

/// Normalise a requested member limit; non-positive values use the default.
pub fn normalize_max_members(requested: Option<i32>) -> i32 {
    match requested {
        Some(n) if n > 0 => n,
        _ => DEFAULT_MAX_MEMBERS,
    }
}

/// Validate a board title. Returns the trimmed title.
pub fn validate_board_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title is required".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_sizes_normalise_to_five() {
        assert_eq!(GridSize::from_requested(3), GridSize::Three);
        assert_eq!(GridSize::from_requested(7), GridSize::Seven);
        assert_eq!(GridSize::from_requested(5), GridSize::Five);
        assert_eq!(GridSize::from_requested(4), GridSize::Five);
        assert_eq!(GridSize::from_requested(0), GridSize::Five);
    }

    #[test]
    fn positions_outside_grid_are_rejected() {
        let grid = GridSize::Three;
        assert!(grid.validate_position(0).is_ok());
        assert!(grid.validate_position(8).is_ok());

        let err = grid.validate_position(9).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidPosition {
                position: 9,
                grid_size: 3
            }
        ));
        assert!(grid.validate_position(-1).is_err());
    }

    #[test]
    fn coordinates_are_row_major() {
        assert_eq!(GridSize::Five.coordinates(0), (0, 0));
        assert_eq!(GridSize::Five.coordinates(7), (1, 2));
        assert_eq!(GridSize::Seven.coordinates(48), (6, 6));
    }

    #[test]
    fn unknown_board_type_falls_back_to_personal() {
        assert_eq!(BoardType::parse_lenient("shared"), BoardType::Shared);
        assert_eq!(BoardType::parse_lenient("personal"), BoardType::Personal);
        assert_eq!(BoardType::parse_lenient("team"), BoardType::Personal);
        assert_eq!(BoardType::parse_lenient(""), BoardType::Personal);
    }

    #[test]
    fn grid_size_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&GridSize::Seven).unwrap(), "7");
        let parsed: GridSize = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, GridSize::Three);
        assert!(serde_json::from_str::<GridSize>("4").is_err());
    }

    #[test]
    fn member_limit_defaults() {
        assert_eq!(normalize_max_members(None), 5);
        assert_eq!(normalize_max_members(Some(0)), 5);
        assert_eq!(normalize_max_members(Some(-2)), 5);
        assert_eq!(normalize_max_members(Some(12)), 12);
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert!(validate_board_title("   ").is_err());
        assert_eq!(validate_board_title(" 2026 ").unwrap(), "2026");
    }
}
