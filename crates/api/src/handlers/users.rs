//! Handlers for the caller's own profile.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bingoals_core::types::DbId;
use bingoals_db::models::NewUser;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

/// PUT /api/v1/me
///
/// Create or refresh the caller's profile. The id always comes from the
/// token subject.
pub async fn upsert_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> AppResult<impl IntoResponse> {
    let user = state.engine.upsert_profile(auth.user_id, input).await?;
    tracing::info!(user_id = %user.id, "Profile upserted");
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/me/rewards
pub async fn get_rewards(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = state.engine.reward_summary(auth.user_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/me/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let notifications = state.engine.notifications(auth.user_id).await?;
    Ok(Json(DataResponse { data: notifications }))
}

/// PUT /api/v1/me/notifications/{id}/read
pub async fn mark_notification_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .engine
        .mark_notification_read(auth.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/me/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let marked = state.engine.mark_all_notifications_read(auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked },
    }))
}
