//! Route definitions for boards, their goal cells and the board socket.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::{boards, goals, mini_goals};
use crate::state::AppState;
use crate::ws;

/// Board routes mounted at `/boards`.
///
/// ```text
/// GET    /                                                -> list_boards
/// POST   /                                                -> create_board
/// GET    /{id}                                            -> get_board
/// PATCH  /{id}                                            -> update_board
/// DELETE /{id}                                            -> delete_board
/// GET    /{id}/members                                    -> list_members
/// POST   /{id}/members                                    -> add_member
/// DELETE /{id}/members/{user_id}                          -> remove_member
/// POST   /{id}/invites                                    -> create_invite
/// GET    /{id}/activity                                   -> list_activity
/// GET    /{id}/ws                                         -> board_socket
/// PUT    /{id}/goals/{position}                           -> update_goal
/// POST   /{id}/goals/{position}/toggle                    -> toggle_goal
/// GET    /{id}/goals/{position}/status                    -> get_status
/// GET    /{id}/goals/{position}/reflection                -> get_reflection
/// PUT    /{id}/goals/{position}/reflection                -> update_reflection
/// POST   /{id}/goals/{position}/mini-goals                -> create_mini_goal
/// PATCH  /{id}/goals/{position}/mini-goals/{mid}          -> update_mini_goal
/// DELETE /{id}/goals/{position}/mini-goals/{mid}          -> delete_mini_goal
/// POST   /{id}/goals/{position}/mini-goals/{mid}/toggle   -> toggle_mini_goal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(boards::list_boards).post(boards::create_board))
        .route(
            "/{id}",
            get(boards::get_board)
                .patch(boards::update_board)
                .delete(boards::delete_board),
        )
        .route(
            "/{id}/members",
            get(boards::list_members).post(boards::add_member),
        )
        .route(
            "/{id}/members/{user_id}",
            delete(boards::remove_member),
        )
        .route("/{id}/invites", post(boards::create_invite))
        .route("/{id}/activity", get(boards::list_activity))
        .route("/{id}/ws", get(ws::board_socket))
        .route("/{id}/goals/{position}", put(goals::update_goal))
        .route("/{id}/goals/{position}/toggle", post(goals::toggle_goal))
        .route("/{id}/goals/{position}/status", get(goals::get_status))
        .route(
            "/{id}/goals/{position}/reflection",
            get(goals::get_reflection).put(goals::update_reflection),
        )
        .route(
            "/{id}/goals/{position}/mini-goals",
            post(mini_goals::create_mini_goal),
        )
        .route(
            "/{id}/goals/{position}/mini-goals/{mini_goal_id}",
            patch(mini_goals::update_mini_goal)
                .delete(mini_goals::delete_mini_goal),
        )
        .route(
            "/{id}/goals/{position}/mini-goals/{mini_goal_id}/toggle",
            post(mini_goals::toggle_mini_goal),
        )
}
