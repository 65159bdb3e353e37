//! Attendance rules applied to an in-memory [`Event`] aggregate.

use crate::error::CoreError;
use crate::event::{Attendance, Event};
use crate::types::{new_id, DbId};

/// Add an RSVP for `user_id`.
///
/// Hosts cannot RSVP to their own event, and a user holds at most one
/// attendance entry per event.
pub fn add_attendee(
    event: &mut Event,
    user_id: DbId,
    attending_for: Option<&str>,
) -> Result<Attendance, CoreError> {
    if event.is_hosted_by(user_id) {
        return Err(CoreError::Forbidden(
            "You cannot attend your own event as a guest".into(),
        ));
    }
    if event.attendance_for(user_id).is_some() {
        return Err(CoreError::Conflict(
            "You are already attending this event".into(),
        ));
    }

    let entry = Attendance {
        id: new_id(),
        user_id,
        attending_for: attending_for.map(str::trim).unwrap_or_default().to_string(),
    };
    event.attendees.push(entry.clone());
    Ok(entry)
}

/// Remove the RSVP held by `user_id`.
pub fn remove_attendee(event: &mut Event, user_id: DbId) -> Result<Attendance, CoreError> {
    let idx = event
        .attendees
        .iter()
        .position(|a| a.user_id == user_id)
        .ok_or(CoreError::NotFound {
            entity: "Attendance",
            id: user_id,
        })?;
    Ok(event.attendees.remove(idx))
}
