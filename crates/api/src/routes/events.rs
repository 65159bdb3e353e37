//! Route definitions for the `/events` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                              -> list_events
/// POST   /                              -> create_event
/// GET    /{id}                          -> get_event
/// PUT    /{id}                          -> update_event
/// DELETE /{id}                          -> delete_event
/// PUT    /{id}/image                    -> upload_image
/// POST   /{id}/attend                   -> attend_event
/// DELETE /{id}/attend                   -> cancel_attendance
/// POST   /{event_id}/slots/{slot_id}    -> book_slot
/// DELETE /{event_id}/slots/{slot_id}    -> cancel_slot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/image", put(events::upload_image))
        .route(
            "/{id}/attend",
            post(events::attend_event).delete(events::cancel_attendance),
        )
        .route(
            "/{event_id}/slots/{slot_id}",
            post(events::book_slot).delete(events::cancel_slot),
        )
}
