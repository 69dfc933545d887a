pub mod boards;
pub mod comments;
pub mod health;
pub mod invites;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /boards                                                  list, create
/// /boards/{id}                                             get, update, delete
/// /boards/{id}/members                                     list, add
/// /boards/{id}/members/{user_id}                           remove (DELETE)
/// /boards/{id}/invites                                     create invite (POST)
/// /boards/{id}/activity                                    activity feed (GET)
/// /boards/{id}/ws                                          WebSocket
///
/// /boards/{id}/goals/{position}                            update metadata (PUT)
/// /boards/{id}/goals/{position}/toggle                     toggle completion (POST)
/// /boards/{id}/goals/{position}/status                     effective status (GET)
/// /boards/{id}/goals/{position}/reflection                 get, edit (GET, PUT)
/// /boards/{id}/goals/{position}/mini-goals                 create (POST)
/// /boards/{id}/goals/{position}/mini-goals/{mid}           update, delete
/// /boards/{id}/goals/{position}/mini-goals/{mid}/toggle    toggle (POST)
///
/// /goals/{id}/comments                                     list, add (GET, POST)
/// /comments/{id}                                           delete (DELETE)
/// /goals/{id}/reactions                                    list, toggle (GET, POST)
///
/// /invites/{code}/join                                     join a board (POST)
///
/// /me                                                      upsert profile (PUT)
/// /me/rewards                                              reward summary (GET)
/// /me/notifications                                        notifications (GET)
/// /me/notifications/{id}/read                              mark read (PUT)
/// /me/notifications/read-all                               mark all read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/boards", boards::router())
        .merge(comments::router())
        .nest("/invites", invites::router())
        .nest("/me", users::router())
}
