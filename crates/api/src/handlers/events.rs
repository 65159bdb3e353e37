//! Handlers for the `/events` resource: the event lifecycle, RSVPs and
//! slot bookings.
//!
//! Reads are public. Every write requires authentication via [`AuthUser`];
//! ownership and role checks happen in the booking services.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use openmic_core::event::{Event, EventPatch, EventStatus, NewEvent};
use openmic_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    /// One of `upcoming`, `ongoing`, `completed`, `cancelled`.
    pub status: Option<String>,
}

/// Body for `POST /events/{id}/attend`.
#[derive(Debug, Default, Deserialize)]
pub struct AttendRequest {
    #[serde(default)]
    pub attending_for: Option<String>,
}

/// An event together with its derived counts.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub attendee_count: usize,
    pub comedian_count: usize,
    pub available_slot_count: usize,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            attendee_count: event.attendee_count(),
            comedian_count: event.comedian_count(),
            available_slot_count: event.available_slot_count(),
            event,
        }
    }
}

fn view(event: Event) -> Json<DataResponse<EventView>> {
    Json(DataResponse { data: event.into() })
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<EventStatus>)
        .transpose()?;

    let events = state.services.events.list(status).await?;
    let data: Vec<EventView> = events.into_iter().map(EventView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = state.services.events.find(event_id).await?;
    Ok(view(event))
}

/// POST /api/v1/events
///
/// The authenticated user becomes the host. Returns 201 Created.
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<NewEvent>,
) -> AppResult<impl IntoResponse> {
    input.host_id = auth.user_id;
    let event = state.services.events.create(input).await?;
    Ok((StatusCode::CREATED, view(event)))
}

/// PUT /api/v1/events/{id}
///
/// Host-only partial update. `status: "cancelled"` cancels the event.
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(patch): Json<EventPatch>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .services
        .events
        .update(event_id, auth.user_id, patch)
        .await?;
    Ok(view(event))
}

/// DELETE /api/v1/events/{id}
///
/// Host-only. Returns 204 No Content.
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.services.events.delete(event_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/events/{id}/image
///
/// Raw image body; the `Content-Type` header must be an `image/*` type.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Content-Type header".into()))?;

    let event = state
        .services
        .events
        .replace_image(event_id, auth.user_id, body.to_vec(), content_type)
        .await?;
    Ok(view(event))
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{id}/attend
pub async fn attend_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(body): Json<AttendRequest>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .services
        .attendance
        .rsvp(event_id, auth.user_id, body.attending_for.as_deref())
        .await?;
    Ok(view(event))
}

/// DELETE /api/v1/events/{id}/attend
pub async fn cancel_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .services
        .attendance
        .cancel_rsvp(event_id, auth.user_id)
        .await?;
    Ok(view(event))
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{event_id}/slots/{slot_id}
///
/// Comedian-only. 409 if someone else got the slot first.
pub async fn book_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((event_id, slot_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .services
        .slots
        .book_slot(event_id, slot_id, auth.user_id)
        .await?;
    Ok(view(event))
}

/// DELETE /api/v1/events/{event_id}/slots/{slot_id}
pub async fn cancel_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((event_id, slot_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .services
        .slots
        .cancel_slot(event_id, slot_id, auth.user_id)
        .await?;
    Ok(view(event))
}
