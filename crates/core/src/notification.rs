//! Notification records and the wording used for each lifecycle trigger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::event::{Event, TimeSlot};
use crate::types::{new_id, DbId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    SlotAvailable,
    PerformanceReminder,
    EventCancelled,
    SlotConfirmed,
    NewAttendee,
    EventUpdated,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SlotAvailable => "slot_available",
            Self::PerformanceReminder => "performance_reminder",
            Self::EventCancelled => "event_cancelled",
            Self::SlotConfirmed => "slot_confirmed",
            Self::NewAttendee => "new_attendee",
            Self::EventUpdated => "event_updated",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slot_available" => Ok(Self::SlotAvailable),
            "performance_reminder" => Ok(Self::PerformanceReminder),
            "event_cancelled" => Ok(Self::EventCancelled),
            "slot_confirmed" => Ok(Self::SlotConfirmed),
            "new_attendee" => Ok(Self::NewAttendee),
            "event_updated" => Ok(Self::EventUpdated),
            other => Err(CoreError::Validation(format!(
                "Invalid notification type '{other}'"
            ))),
        }
    }
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub event_id: Option<DbId>,
    pub time_slot_id: Option<DbId>,
    pub read: bool,
    pub created_at: Timestamp,
}

/// Recipient-independent content of a notification.
///
/// The dispatcher stamps one [`Notification`] per recipient from a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub event_id: Option<DbId>,
    pub time_slot_id: Option<DbId>,
}

impl NotificationDraft {
    /// Materialize the draft for one recipient.
    pub fn for_recipient(&self, recipient_id: DbId) -> Notification {
        Notification {
            id: new_id(),
            recipient_id,
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            event_id: self.event_id,
            time_slot_id: self.time_slot_id,
            read: false,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Why an event's roster is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeReason {
    Cancelled,
    Deleted,
}

impl CascadeReason {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Deleted => "deleted",
        }
    }
}

/// Calendar date in `M/D/YYYY` form, as shown in notification text.
pub fn display_date(ts: Timestamp) -> String {
    ts.format("%-m/%-d/%Y").to_string()
}

// ---------------------------------------------------------------------------
// Wording
// ---------------------------------------------------------------------------

const TITLE_SLOTS_AVAILABLE: &str = "New Performance Slots Available";

/// A new event was published with open slots.
pub fn new_event_slots(event: &Event) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::SlotAvailable,
        title: TITLE_SLOTS_AVAILABLE.into(),
        message: format!(
            "New open mic event \"{}\" at {} on {} has slots available.",
            event.name,
            event.venue,
            display_date(event.date)
        ),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}

/// An update to an existing event opened `count` new slots.
pub fn slots_added(event: &Event, count: usize) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::SlotAvailable,
        title: TITLE_SLOTS_AVAILABLE.into(),
        message: format!(
            "Event \"{}\" at {} has {count} new performance slots available.",
            event.name, event.venue
        ),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}

/// Sent to every attendee when the event is cancelled or deleted.
pub fn attendee_cascade(event: &Event, reason: CascadeReason) -> NotificationDraft {
    let title = match reason {
        CascadeReason::Cancelled => "Event Cancelled",
        CascadeReason::Deleted => "Event Deleted",
    };
    NotificationDraft {
        kind: NotificationType::EventCancelled,
        title: title.into(),
        message: format!(
            "The event \"{}\" at {} on {} has been {}.",
            event.name,
            event.venue,
            display_date(event.date),
            reason.past_tense()
        ),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}

/// Sent to every booked comedian when the event is cancelled or deleted.
pub fn performer_cascade(event: &Event, reason: CascadeReason) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::EventCancelled,
        title: "Performance Cancelled".into(),
        message: format!(
            "The event \"{}\" at {} where you were scheduled to perform has been {}.",
            event.name,
            event.venue,
            reason.past_tense()
        ),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}

/// Sent to a comedian after a successful booking.
pub fn slot_confirmed(event: &Event, slot: &TimeSlot) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::SlotConfirmed,
        title: "Performance Slot Confirmed".into(),
        message: format!(
            "You are booked for slot #{} at \"{}\" ({}) on {}, starting {}.",
            slot.order,
            event.name,
            event.venue,
            display_date(event.date),
            slot.start_time.format("%H:%M UTC")
        ),
        event_id: Some(event.id),
        time_slot_id: Some(slot.id),
    }
}

/// Sent to the host when someone RSVPs.
pub fn new_attendee(event: &Event, attendee_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::NewAttendee,
        title: "New Attendee".into(),
        message: format!("{attendee_name} is attending \"{}\".", event.name),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}

/// Sent to attendees and performers when the venue or schedule moves.
pub fn event_updated(event: &Event) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationType::EventUpdated,
        title: "Event Updated".into(),
        message: format!(
            "The event \"{}\" has been updated. It now takes place at {} on {}.",
            event.name,
            event.venue,
            display_date(event.date)
        ),
        event_id: Some(event.id),
        time_slot_id: None,
    }
}
