//! Route definitions for redeeming invite codes.

use axum::routing::post;
use axum::Router;

use crate::handlers::boards;
use crate::state::AppState;

/// Invite routes mounted at `/invites`.
///
/// ```text
/// POST /{code}/join  -> join_board
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{code}/join", post(boards::join_board))
}
