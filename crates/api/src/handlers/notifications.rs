//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever
//! touch the caller's own notifications.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use openmic_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
}

/// GET /api/v1/notifications
///
/// Newest first, at most 50.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let notifications = state
        .services
        .inbox
        .list(auth.user_id, params.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.services.inbox.unread_count(auth.user_id).await?;
    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notification = state
        .services
        .inbox
        .mark_read(notification_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: notification }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.services.inbox.mark_all_read(auth.user_id).await?;
    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// DELETE /api/v1/notifications/{id}
///
/// Returns 204 No Content.
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .services
        .inbox
        .delete(notification_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
