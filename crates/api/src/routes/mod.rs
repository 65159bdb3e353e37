pub mod events;
pub mod health;
pub mod notifications;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /events                                   list, create
/// /events/{id}                              get, update, delete (host)
/// /events/{id}/image                        replace image (host)
/// /events/{id}/attend                       RSVP, cancel RSVP
/// /events/{event_id}/slots/{slot_id}        book, release (comedian)
///
/// /users/me                                 profile, update profile
/// /users/me/notification-preferences        update (comedian)
/// /users/me/reconcile                       rebuild back-references
///
/// /notifications                            list
/// /notifications/unread-count               count
/// /notifications/read-all                   mark all read
/// /notifications/{id}/read                  mark one read
/// /notifications/{id}                       delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .nest("/users", users::router())
        .nest("/notifications", notifications::router())
}
