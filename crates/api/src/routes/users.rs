//! Route definitions for the caller's own profile.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Profile routes mounted at `/me`.
///
/// ```text
/// PUT  /                          -> upsert_me
/// GET  /rewards                   -> get_rewards
/// GET  /notifications             -> list_notifications
/// PUT  /notifications/{id}/read   -> mark_notification_read
/// POST /notifications/read-all    -> mark_all_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(users::upsert_me))
        .route("/rewards", get(users::get_rewards))
        .route("/notifications", get(users::list_notifications))
        .route(
            "/notifications/{id}/read",
            put(users::mark_notification_read),
        )
        .route("/notifications/read-all", post(users::mark_all_read))
}
