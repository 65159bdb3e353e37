//! Event row model. Slots and attendance are embedded as JSONB.

use openmic_core::event::{Address, Attendance, Event, GeoPoint, TimeSlot};
use openmic_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use sqlx::types::Json;

use super::decode_error;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: DbId,
    pub host_id: DbId,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub address: Json<Address>,
    pub longitude: f64,
    pub latitude: f64,
    pub event_date: Timestamp,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub image: Option<String>,
    pub status: String,
    pub time_slots: Json<Vec<TimeSlot>>,
    pub attendees: Json<Vec<Attendance>>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<EventRow> for Event {
    type Error = sqlx::Error;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: row.id,
            host_id: row.host_id,
            name: row.name,
            description: row.description,
            venue: row.venue,
            address: row.address.0,
            location: GeoPoint {
                longitude: row.longitude,
                latitude: row.latitude,
            },
            date: row.event_date,
            start_time: row.start_time,
            end_time: row.end_time,
            image: row.image,
            status: row.status.parse().map_err(decode_error)?,
            time_slots: row.time_slots.0,
            attendees: row.attendees.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
