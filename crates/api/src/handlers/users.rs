//! Handlers for the authenticated user's own profile (`/users/me`).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use openmic_core::user::{PreferencesPatch, ProfilePatch};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn get_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = state.services.users.profile(auth.user_id).await?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/users/me
///
/// Fields left out of the body keep their current value.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .services
        .users
        .update_profile(auth.user_id, &patch)
        .await?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/users/me/notification-preferences
///
/// Comedian-only. Fields left out of the body keep their current value.
pub async fn update_notification_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> AppResult<impl IntoResponse> {
    let prefs = state
        .services
        .users
        .update_notification_preferences(auth.user_id, &patch)
        .await?;
    Ok(Json(DataResponse { data: prefs }))
}

/// POST /api/v1/users/me/reconcile
///
/// Rebuild the caller's attending and performance-slot lists from the
/// event documents and return the repaired profile.
pub async fn reconcile_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = state.services.reconciler.reconcile_user(auth.user_id).await?;
    Ok(Json(DataResponse { data: user }))
}
