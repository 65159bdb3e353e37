//! Route definitions for the `/users` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me                            -> get_me
/// PUT    /me                            -> update_me
/// PUT    /me/notification-preferences   -> update_notification_preferences
/// POST   /me/reconcile                  -> reconcile_me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_me).put(users::update_me))
        .route(
            "/me/notification-preferences",
            put(users::update_notification_preferences),
        )
        .route("/me/reconcile", post(users::reconcile_me))
}
