//! Event aggregate: the event document with its embedded time slots and
//! attendance entries.
//!
//! The event is the source of truth for who holds a slot and who is
//! attending. User-side lists are back-references derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{new_id, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled events never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Allowed moves: upcoming -> ongoing -> completed, and
    /// upcoming/ongoing -> cancelled.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::Ongoing)
                | (Self::Ongoing, Self::Completed)
                | (Self::Upcoming, Self::Cancelled)
                | (Self::Ongoing, Self::Cancelled)
        )
    }

    /// Validate a requested transition. Re-setting the current status is a no-op.
    pub fn check_transition(self, next: EventStatus) -> Result<(), CoreError> {
        if self == next || self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot change event status from {self} to {next}"
            )))
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid event status '{other}'. Must be one of: upcoming, ongoing, completed, cancelled"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Embedded entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, message = "street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "zip code is required"))]
    pub zip_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
}

/// A bookable performance window.
///
/// `is_taken` mirrors `claimant.is_some()`; the two are only ever changed
/// together through [`TimeSlot::claim`] and [`TimeSlot::release`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub order: i32,
    pub claimant: Option<DbId>,
    pub is_taken: bool,
}

impl TimeSlot {
    /// A fresh open slot at the given 1-based position.
    pub fn open(spec: &SlotSpec, order: i32) -> Self {
        Self {
            id: new_id(),
            start_time: spec.start_time,
            end_time: spec.end_time,
            order,
            claimant: None,
            is_taken: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.claimant.is_none()
    }

    pub(crate) fn claim(&mut self, comedian_id: DbId) {
        self.claimant = Some(comedian_id);
        self.is_taken = true;
    }

    pub(crate) fn release(&mut self) {
        self.claimant = None;
        self.is_taken = false;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: DbId,
    pub user_id: DbId,
    pub attending_for: String,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: DbId,
    pub host_id: DbId,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub address: Address,
    pub location: GeoPoint,
    pub date: Timestamp,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub image: Option<String>,
    pub status: EventStatus,
    pub time_slots: Vec<TimeSlot>,
    pub attendees: Vec<Attendance>,
    /// Optimistic concurrency token, bumped by the store on every write.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Build a new upcoming event from validated input.
    ///
    /// Slots are numbered by their position in `input.time_slots`, starting at 1.
    pub fn new(input: NewEvent) -> Result<Self, CoreError> {
        input.check()?;
        let now = chrono::Utc::now();
        let time_slots = input
            .time_slots
            .iter()
            .zip(1..)
            .map(|(spec, order)| TimeSlot::open(spec, order))
            .collect();

        Ok(Self {
            id: new_id(),
            host_id: input.host_id,
            name: input.name.trim().to_string(),
            description: input.description,
            venue: input.venue.trim().to_string(),
            address: input.address,
            location: input.location,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            image: input.image,
            status: EventStatus::Upcoming,
            time_slots,
            attendees: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_hosted_by(&self, user_id: DbId) -> bool {
        self.host_id == user_id
    }

    /// Fail with [`CoreError::Forbidden`] unless `user_id` is the host.
    pub fn require_host(&self, user_id: DbId, action: &str) -> Result<(), CoreError> {
        if self.is_hosted_by(user_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "You are not authorized to {action} this event"
            )))
        }
    }

    /// Fail with [`CoreError::Conflict`] if the event no longer takes bookings.
    pub fn require_live(&self) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            Err(CoreError::Conflict(format!("Event is {}", self.status)))
        } else {
            Ok(())
        }
    }

    pub fn slot(&self, slot_id: DbId) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: DbId) -> Option<&mut TimeSlot> {
        self.time_slots.iter_mut().find(|s| s.id == slot_id)
    }

    pub fn attendance_for(&self, user_id: DbId) -> Option<&Attendance> {
        self.attendees.iter().find(|a| a.user_id == user_id)
    }

    /// Distinct attendee user ids, in RSVP order.
    pub fn attendee_ids(&self) -> Vec<DbId> {
        let mut ids = Vec::with_capacity(self.attendees.len());
        for a in &self.attendees {
            if !ids.contains(&a.user_id) {
                ids.push(a.user_id);
            }
        }
        ids
    }

    /// Distinct claimant user ids across all taken slots, in slot order.
    pub fn claimant_ids(&self) -> Vec<DbId> {
        let mut ids = Vec::new();
        for id in self.time_slots.iter().filter_map(|s| s.claimant) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    pub fn comedian_count(&self) -> usize {
        self.time_slots.iter().filter(|s| s.is_taken).count()
    }

    pub fn available_slot_count(&self) -> usize {
        self.time_slots.iter().filter(|s| !s.is_taken).count()
    }
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Requested slot window. `id` is only set when a client echoes back an
/// existing slot during an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    #[serde(default)]
    pub id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl SlotSpec {
    fn check(&self) -> Result<(), CoreError> {
        if self.end_time <= self.start_time {
            return Err(CoreError::Validation(
                "Time slot end time must be after its start time".into(),
            ));
        }
        Ok(())
    }
}

/// Input for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    #[serde(skip)]
    pub host_id: DbId,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 200, message = "venue is required"))]
    pub venue: String,
    #[validate(nested)]
    pub address: Address,
    #[validate(nested)]
    pub location: GeoPoint,
    pub date: Timestamp,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<SlotSpec>,
}

impl NewEvent {
    /// Field-level validation plus time-ordering rules.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        check_window(self.start_time, self.end_time)?;
        self.time_slots.iter().try_for_each(SlotSpec::check)
    }
}

/// Partial update for an event. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventPatch {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub venue: Option<String>,
    #[validate(nested)]
    pub address: Option<Address>,
    #[validate(nested)]
    pub location: Option<GeoPoint>,
    pub date: Option<Timestamp>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status: Option<EventStatus>,
    pub time_slots: Option<Vec<SlotSpec>>,
}

/// What a patch changed, so callers can decide which notifications to send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Venue, address, location, date or times changed.
    pub schedule_changed: bool,
    /// Number of open slots appended by a slot-list replacement.
    pub slots_added: usize,
    /// The patch moved the event into `cancelled`.
    pub cancelled: bool,
}

impl EventPatch {
    /// Validate the patch on its own (field rules and slot windows).
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(slots) = &self.time_slots {
            slots.iter().try_for_each(SlotSpec::check)?;
        }
        Ok(())
    }

    /// Apply the whole patch: fields, then the slot list, then the status.
    ///
    /// Status changes go through [`EventStatus::check_transition`].
    pub fn apply(&self, event: &mut Event) -> Result<PatchOutcome, CoreError> {
        if event.status.is_terminal() {
            // Only re-sending the current status is accepted.
            if self.status != Some(event.status) || self.changes_content() {
                return Err(CoreError::Conflict(format!("Event is {}", event.status)));
            }
            return Ok(PatchOutcome::default());
        }

        let schedule_changed = self.apply_fields(event)?;
        let slots_added = match &self.time_slots {
            Some(specs) => crate::slots::replace_open_slots(event, specs),
            None => 0,
        };

        let mut cancelled = false;
        if let Some(next) = self.status {
            event.status.check_transition(next)?;
            cancelled = next == EventStatus::Cancelled && event.status != next;
            event.status = next;
        }

        Ok(PatchOutcome {
            schedule_changed,
            slots_added,
            cancelled,
        })
    }

    /// Whether the patch touches anything besides the status.
    pub fn changes_content(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.venue.is_some()
            || self.address.is_some()
            || self.location.is_some()
            || self.date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
            || self.time_slots.is_some()
    }

    /// Apply the plain field patches (everything except status and slots).
    ///
    /// Fails with [`CoreError::Validation`] if the result would end before it starts.
    pub fn apply_fields(&self, event: &mut Event) -> Result<bool, CoreError> {
        let mut schedule_changed = false;

        if let Some(name) = &self.name {
            event.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(venue) = &self.venue {
            let venue = venue.trim();
            schedule_changed |= event.venue != venue;
            event.venue = venue.to_string();
        }
        if let Some(address) = &self.address {
            schedule_changed |= event.address != *address;
            event.address = address.clone();
        }
        if let Some(location) = self.location {
            schedule_changed |= event.location != location;
            event.location = location;
        }
        if let Some(date) = self.date {
            schedule_changed |= event.date != date;
            event.date = date;
        }
        if let Some(start) = self.start_time {
            schedule_changed |= event.start_time != start;
            event.start_time = start;
        }
        if let Some(end) = self.end_time {
            schedule_changed |= event.end_time != end;
            event.end_time = end;
        }

        check_window(event.start_time, event.end_time)?;
        Ok(schedule_changed)
    }
}

fn check_window(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(
            "Event end time must be after its start time".into(),
        ));
    }
    Ok(())
}
