//! Route definitions for goal comments and reactions.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Comment and reaction routes, merged at the `/api/v1` root.
///
/// ```text
/// GET    /goals/{id}/comments   -> list_comments
/// POST   /goals/{id}/comments   -> add_comment
/// DELETE /comments/{id}         -> delete_comment
/// GET    /goals/{id}/reactions  -> list_reactions
/// POST   /goals/{id}/reactions  -> toggle_reaction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/goals/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/comments/{id}", delete(comments::delete_comment))
        .route(
            "/goals/{id}/reactions",
            get(comments::list_reactions).post(comments::toggle_reaction),
        )
}
