//! Handlers for mini-goals of one goal cell.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bingoals_core::types::DbId;

use crate::engine::{CreateMiniGoal, UpdateMiniGoal};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/boards/{id}/goals/{position}/mini-goals
///
/// Returns the owning goal with its recomputed progress.
pub async fn create_mini_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
    Json(input): Json<CreateMiniGoal>,
) -> AppResult<impl IntoResponse> {
    let goal = state
        .engine
        .create_mini_goal(auth.user_id, board_id, position, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: goal })))
}

/// PATCH /api/v1/boards/{id}/goals/{position}/mini-goals/{mini_goal_id}
pub async fn update_mini_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position, mini_goal_id)): Path<(DbId, i32, DbId)>,
    Json(input): Json<UpdateMiniGoal>,
) -> AppResult<impl IntoResponse> {
    let goal = state
        .engine
        .update_mini_goal(auth.user_id, board_id, position, mini_goal_id, input)
        .await?;
    Ok(Json(DataResponse { data: goal }))
}

/// DELETE /api/v1/boards/{id}/goals/{position}/mini-goals/{mini_goal_id}
pub async fn delete_mini_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position, mini_goal_id)): Path<(DbId, i32, DbId)>,
) -> AppResult<impl IntoResponse> {
    let goal = state
        .engine
        .delete_mini_goal(auth.user_id, board_id, position, mini_goal_id)
        .await?;
    Ok(Json(DataResponse { data: goal }))
}

/// POST /api/v1/boards/{id}/goals/{position}/mini-goals/{mini_goal_id}/toggle
pub async fn toggle_mini_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position, mini_goal_id)): Path<(DbId, i32, DbId)>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .toggle_mini_goal(auth.user_id, board_id, position, mini_goal_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
