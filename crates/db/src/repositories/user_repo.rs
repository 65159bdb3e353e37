//! Repository for the `users` table.
//!
//! The back-reference columns are only ever changed with targeted array
//! updates so concurrent ledger writes on the same user do not overwrite
//! each other.

use openmic_core::types::DbId;
use openmic_core::user::{NotificationPreferences, PerformanceSlotRef, User};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::user::UserRow;

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, password_hash, user_type, bio, profile_picture, \
    events_attending, performance_slots, events_hosting, notification_preferences, \
    created_at, updated_at";

/// Provides document operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Insert a fully built user document.
    pub async fn insert(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, user_type, bio, \
                 profile_picture, events_attending, performance_slots, events_hosting, \
                 notification_preferences, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .bind(&user.events_attending)
        .bind(Json(&user.performance_slots))
        .bind(&user.events_hosting)
        .bind(Json(&user.notification_preferences))
        .bind(user.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Comedians with notifications and slot alerts both enabled, oldest first.
    pub async fn list_slot_alert_recipients(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE user_type = 'comedian' \
               AND (notification_preferences->>'enable_notifications')::boolean \
               AND (notification_preferences->>'available_slot_alerts')::boolean \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Overwrite a user's notification preferences.
    pub async fn update_preferences(
        pool: &PgPool,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET notification_preferences = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(Json(prefs))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_profile(pool: &PgPool, user: &User) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, bio = $3, profile_picture = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add `event_id` to `events_attending` unless already present.
    ///
    /// Returns `true` if the user exists.
    pub async fn add_event_attending(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Self::add_to_array(pool, "events_attending", user_id, event_id).await
    }

    /// Returns `true` if the entry was present and removed.
    pub async fn remove_event_attending(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Self::remove_from_array(pool, "events_attending", user_id, event_id).await
    }

    /// Add `event_id` to `events_hosting` unless already present.
    pub async fn add_event_hosting(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Self::add_to_array(pool, "events_hosting", user_id, event_id).await
    }

    pub async fn remove_event_hosting(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Self::remove_from_array(pool, "events_hosting", user_id, event_id).await
    }

    /// Append a performance slot entry unless an identical one exists.
    ///
    /// Returns `true` if the user exists.
    pub async fn add_performance_slot(
        pool: &PgPool,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET \
                 performance_slots = CASE \
                     WHEN performance_slots @> $2 THEN performance_slots \
                     ELSE performance_slots || $2 \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(Json([entry]))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the entry was present and removed.
    pub async fn remove_performance_slot(
        pool: &PgPool,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET \
                 performance_slots = COALESCE( \
                     (SELECT jsonb_agg(p) FROM jsonb_array_elements(performance_slots) p \
                      WHERE p <> $2), \
                     '[]'::jsonb), \
                 updated_at = NOW() \
             WHERE id = $1 AND performance_slots @> jsonb_build_array($2)",
        )
        .bind(user_id)
        .bind(Json(entry))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pull `event_id` from every listed attendee's `events_attending` and
    /// every performance slot entry for it from every listed claimant, in
    /// one statement.
    ///
    /// Returns the number of user rows touched.
    pub async fn unlink_event(
        pool: &PgPool,
        event_id: DbId,
        attendee_ids: &[DbId],
        claimant_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if attendee_ids.is_empty() && claimant_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE users SET \
                 events_attending = CASE \
                     WHEN id = ANY($2) THEN array_remove(events_attending, $1) \
                     ELSE events_attending \
                 END, \
                 performance_slots = CASE \
                     WHEN id = ANY($3) THEN COALESCE( \
                         (SELECT jsonb_agg(p) FROM jsonb_array_elements(performance_slots) p \
                          WHERE p->>'event_id' <> $4), \
                         '[]'::jsonb) \
                     ELSE performance_slots \
                 END, \
                 updated_at = NOW() \
             WHERE id = ANY($2) OR id = ANY($3)",
        )
        .bind(event_id)
        .bind(attendee_ids)
        .bind(claimant_ids)
        .bind(event_id.to_string())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Overwrite both back-reference lists.
    pub async fn replace_links(
        pool: &PgPool,
        user_id: DbId,
        events_attending: &[DbId],
        performance_slots: &[PerformanceSlotRef],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET events_attending = $2, performance_slots = $3, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(events_attending)
        .bind(Json(performance_slots))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_to_array(
        pool: &PgPool,
        column: &'static str,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                 {column} = CASE \
                     WHEN $2 = ANY({column}) THEN {column} \
                     ELSE array_append({column}, $2) \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1"
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_array(
        pool: &PgPool,
        column: &'static str,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE users SET {column} = array_remove({column}, $2), updated_at = NOW() \
             WHERE id = $1 AND $2 = ANY({column})"
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
