//! Handlers for boards and board membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bingoals_core::types::DbId;

use crate::engine::{AddMember, CreateBoard, CreateInvite, UpdateBoard};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/boards
pub async fn create_board(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBoard>,
) -> AppResult<impl IntoResponse> {
    let board = state.engine.create_board(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: board })))
}

/// GET /api/v1/boards
///
/// Boards the caller owns or belongs to, newest first.
pub async fn list_boards(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let boards = state.engine.list_boards(auth.user_id).await?;
    Ok(Json(DataResponse { data: boards }))
}

/// GET /api/v1/boards/{id}
///
/// The board with every goal resolved for the caller, plus its members.
pub async fn get_board(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.engine.board_view(auth.user_id, board_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PATCH /api/v1/boards/{id}
pub async fn update_board(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
    Json(input): Json<UpdateBoard>,
) -> AppResult<impl IntoResponse> {
    let board = state
        .engine
        .update_board(auth.user_id, board_id, input)
        .await?;
    Ok(Json(DataResponse { data: board }))
}

/// DELETE /api/v1/boards/{id}
pub async fn delete_board(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.engine.delete_board(auth.user_id, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/boards/{id}/members
pub async fn add_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
    Json(input): Json<AddMember>,
) -> AppResult<impl IntoResponse> {
    let member = state
        .engine
        .add_member(auth.user_id, board_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// GET /api/v1/boards/{id}/members
pub async fn list_members(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let members = state.engine.list_members(auth.user_id, board_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/boards/{id}/invites
///
/// Body may be `{}` for an unlimited invite that never expires.
pub async fn create_invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
    Json(input): Json<CreateInvite>,
) -> AppResult<impl IntoResponse> {
    let invite = state
        .engine
        .create_invite(auth.user_id, board_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: invite })))
}

/// POST /api/v1/invites/{code}/join
pub async fn join_board(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let member = state.engine.join_board(auth.user_id, &code).await?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/boards/{id}/members/{user_id}
pub async fn remove_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((board_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    state
        .engine
        .remove_member(auth.user_id, board_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/boards/{id}/activity
pub async fn list_activity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let activity = state.engine.activity_feed(auth.user_id, board_id).await?;
    Ok(Json(DataResponse { data: activity }))
}
