//! User row model.

use openmic_core::types::{DbId, Timestamp};
use openmic_core::user::{NotificationPreferences, PerformanceSlotRef, User};
use sqlx::FromRow;
use sqlx::types::Json;

use super::decode_error;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub bio: String,
    pub profile_picture: String,
    pub events_attending: Vec<DbId>,
    pub performance_slots: Json<Vec<PerformanceSlotRef>>,
    pub events_hosting: Vec<DbId>,
    pub notification_preferences: Json<NotificationPreferences>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            user_type: row.user_type.parse().map_err(decode_error)?,
            bio: row.bio,
            profile_picture: row.profile_picture,
            events_attending: row.events_attending,
            performance_slots: row.performance_slots.0,
            events_hosting: row.events_hosting,
            notification_preferences: row.notification_preferences.0,
            created_at: row.created_at,
        })
    }
}
