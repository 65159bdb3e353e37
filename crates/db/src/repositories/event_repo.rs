//! Repository for the `events` table.

use openmic_core::event::{Event, EventStatus};
use openmic_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::event::EventRow;

/// Column list for `events` queries.
const COLUMNS: &str = "id, host_id, name, description, venue, address, longitude, latitude, \
    event_date, start_time, end_time, image, status, time_slots, attendees, version, \
    created_at, updated_at";

/// Provides document operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Find an event by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Event::try_from)
            .transpose()
    }

    /// List events by date, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY event_date ASC, start_time ASC"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(status.map(EventStatus::as_str))
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Event::try_from)
            .collect()
    }

    /// Events where `user_id` holds a slot or an attendance entry.
    pub async fn list_involving(pool: &PgPool, user_id: DbId) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE attendees @> jsonb_build_array(jsonb_build_object('user_id', $1::text)) \
                OR time_slots @> jsonb_build_array(jsonb_build_object('claimant', $1::text)) \
             ORDER BY event_date ASC, start_time ASC"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(user_id.to_string())
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Event::try_from)
            .collect()
    }

    /// Insert a new event document.
    pub async fn insert(pool: &PgPool, event: &Event) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO events (id, host_id, name, description, venue, address, longitude, \
                 latitude, event_date, start_time, end_time, image, status, time_slots, \
                 attendees, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18)",
        )
        .bind(event.id)
        .bind(event.host_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.venue)
        .bind(Json(&event.address))
        .bind(event.location.longitude)
        .bind(event.location.latitude)
        .bind(event.date)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.image)
        .bind(event.status.as_str())
        .bind(Json(&event.time_slots))
        .bind(Json(&event.attendees))
        .bind(event.version)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Overwrite the mutable part of the document iff the stored version
    /// still equals `event.version`, bumping the version by one.
    ///
    /// Returns `false` when the row changed since it was read or is gone.
    pub async fn update_if_version(pool: &PgPool, event: &Event) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET \
                 name = $3, description = $4, venue = $5, address = $6, longitude = $7, \
                 latitude = $8, event_date = $9, start_time = $10, end_time = $11, \
                 image = $12, status = $13, time_slots = $14, attendees = $15, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2",
        )
        .bind(event.id)
        .bind(event.version)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.venue)
        .bind(Json(&event.address))
        .bind(event.location.longitude)
        .bind(event.location.latitude)
        .bind(event.date)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.image)
        .bind(event.status.as_str())
        .bind(Json(&event.time_slots))
        .bind(Json(&event.attendees))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete an event, but only at the given version.
    /// Returns `true` if a row was removed.
    pub async fn delete_if_version(
        pool: &PgPool,
        id: DbId,
        version: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(version)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
