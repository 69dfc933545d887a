//! Board invite model.

use bingoals_core::invite;
use bingoals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `board_invites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInvite {
    pub id: DbId,
    pub board_id: DbId,
    pub inviter_id: DbId,
    pub invite_code: String,
    pub expires_at: Option<Timestamp>,
    /// `0` means unlimited.
    pub max_uses: i32,
    pub used_count: i32,
    pub created_at: Timestamp,
}

impl BoardInvite {
    pub fn is_redeemable(&self, now: Timestamp) -> bool {
        invite::is_redeemable(self.expires_at, self.max_uses, self.used_count, now)
    }
}

/// Normalised input for inserting an invite.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub board_id: DbId,
    pub inviter_id: DbId,
    pub invite_code: String,
    pub expires_at: Option<Timestamp>,
    pub max_uses: i32,
}
