//! Milestone detection for completed board cells.
//!
//! [`detect`] is evaluated once per completion edge with the completed
//! positions *after* the just-completed cell has been marked. The set is
//! scoped by the caller: canonical goal status on personal boards, the
//! acting member's own overlay rows on shared boards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::GridSize;

// ---------------------------------------------------------------------------
// Reward constants
// ---------------------------------------------------------------------------

/// Base reward for completing a cell on a 3x3 board.
pub const BASE_REWARD_SMALL: i64 = 5;
/// Base reward for completing a cell on a 5x5 board.
pub const BASE_REWARD_DEFAULT: i64 = 3;
/// Base reward for completing a cell on a 7x7 board.
pub const BASE_REWARD_LARGE: i64 = 2;

pub const LINE_BONUS: i64 = 10;
pub const CORNERS_BONUS: i64 = 15;
pub const BLACKOUT_BONUS: i64 = 50;

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

/// A geometric completion pattern that grants a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Milestone {
    Row,
    Column,
    Diagonal,
    AntiDiagonal,
    Corners,
    Blackout,
}

impl Milestone {
    pub fn label(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
            Self::Diagonal => "diagonal",
            Self::AntiDiagonal => "anti-diagonal",
            Self::Corners => "corners",
            Self::Blackout => "blackout",
        }
    }

    pub fn bonus(self) -> i64 {
        match self {
            Self::Row | Self::Column | Self::Diagonal | Self::AntiDiagonal => LINE_BONUS,
            Self::Corners => CORNERS_BONUS,
            Self::Blackout => BLACKOUT_BONUS,
        }
    }
}

/// Result of a single detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneOutcome {
    /// Base reward plus every milestone bonus.
    pub reward_delta: i64,
    /// Satisfied milestones in evaluation order.
    pub milestones: Vec<Milestone>,
}

impl MilestoneOutcome {
    pub fn labels(&self) -> Vec<&'static str> {
        self.milestones.iter().map(|m| m.label()).collect()
    }
}

/// Reward for completing any single cell, before milestone bonuses.
pub fn base_reward(grid: GridSize) -> i64 {
    match grid {
        GridSize::Three => BASE_REWARD_SMALL,
        GridSize::Seven => BASE_REWARD_LARGE,
        GridSize::Five => BASE_REWARD_DEFAULT,
    }
}

/// Evaluate which patterns the just-completed cell satisfies.
///
/// Checks run in a fixed order (row, column, diagonal, anti-diagonal,
/// corners, blackout) and the output preserves it. Diagonals are only
/// considered when the just-completed cell lies on them. Corners and
/// blackout are checked regardless of where the cell lies.
pub fn detect(completed: &HashSet<i32>, grid: GridSize, just_completed: i32) -> MilestoneOutcome {
    let n = grid.side();
    let (row, col) = grid.coordinates(just_completed);
    let done = |p: i32| completed.contains(&p);

    let mut milestones = Vec::new();

    if (0..n).all(|c| done(row * n + c)) {
        milestones.push(Milestone::Row);
    }

    if (0..n).all(|r| done(r * n + col)) {
        milestones.push(Milestone::Column);
    }

    if row == col && (0..n).all(|i| done(i * n + i)) {
        milestones.push(Milestone::Diagonal);
    }

    if row + col == n - 1 && (0..n).all(|i| done(i * n + (n - 1 - i))) {
        milestones.push(Milestone::AntiDiagonal);
    }

    let corners = [0, n - 1, n * (n - 1), n * n - 1];
    if corners.iter().all(|&p| done(p)) {
        milestones.push(Milestone::Corners);
    }

    let completed_cells = completed
        .iter()
        .filter(|&&p| (0..grid.cells()).contains(&p))
        .count();
    if completed_cells == grid.cells() as usize {
        milestones.push(Milestone::Blackout);
    }

    let reward_delta = base_reward(grid) + milestones.iter().map(|m| m.bonus()).sum::<i64>();

    MilestoneOutcome {
        reward_delta,
        milestones,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
