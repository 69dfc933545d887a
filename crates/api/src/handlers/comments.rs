//! Handlers for goal comments and reactions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bingoals_core::types::DbId;

use crate::engine::{CreateComment, ReactToGoal};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/goals/{id}/comments
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comments = state.engine.list_comments(auth.user_id, goal_id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/goals/{id}/comments
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .engine
        .add_comment(auth.user_id, goal_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .engine
        .delete_comment(auth.user_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/goals/{id}/reactions
pub async fn list_reactions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reactions = state.engine.list_reactions(auth.user_id, goal_id).await?;
    Ok(Json(DataResponse { data: reactions }))
}

/// POST /api/v1/goals/{id}/reactions
///
/// Toggles: 201 when the reaction was added, 200 when it was removed.
pub async fn toggle_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
    Json(input): Json<ReactToGoal>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .toggle_reaction(auth.user_id, goal_id, input)
        .await?;
    let status = if outcome.added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: outcome })))
}
