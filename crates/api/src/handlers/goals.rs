//! Handlers for goal cells addressed by board and position.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bingoals_core::types::DbId;

use crate::engine::{UpdateGoal, UpdateReflection};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/boards/{id}/goals/{position}
///
/// Write goal metadata. An empty `title` clears the cell.
pub async fn update_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
    Json(input): Json<UpdateGoal>,
) -> AppResult<impl IntoResponse> {
    let goal = state
        .engine
        .update_goal(auth.user_id, board_id, position, input)
        .await?;
    Ok(Json(DataResponse { data: goal }))
}

/// POST /api/v1/boards/{id}/goals/{position}/toggle
pub async fn toggle_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .toggle_goal(auth.user_id, board_id, position)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        board_id = %board_id,
        position,
        reward_delta = outcome.reward_delta,
        "Goal toggled",
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/boards/{id}/goals/{position}/status
pub async fn get_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let status = state
        .engine
        .effective_status(auth.user_id, board_id, position)
        .await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/boards/{id}/goals/{position}/reflection
pub async fn get_reflection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let reflection = state
        .engine
        .reflection(auth.user_id, board_id, position)
        .await?;
    Ok(Json(DataResponse { data: reflection }))
}

/// PUT /api/v1/boards/{id}/goals/{position}/reflection
///
/// Owner only. Creates the reflection if the goal has none yet.
pub async fn update_reflection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, position)): Path<(DbId, i32)>,
    Json(input): Json<UpdateReflection>,
) -> AppResult<impl IntoResponse> {
    let reflection = state
        .engine
        .update_reflection(auth.user_id, board_id, position, input)
        .await?;
    Ok(Json(DataResponse { data: reflection }))
}
