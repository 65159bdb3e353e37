//! Notification row model.

use openmic_core::notification::Notification;
use openmic_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::decode_error;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: DbId,
    pub recipient_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub event_id: Option<DbId>,
    pub time_slot_id: Option<DbId>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = sqlx::Error;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            kind: row.notification_type.parse().map_err(decode_error)?,
            title: row.title,
            message: row.message,
            event_id: row.event_id,
            time_slot_id: row.time_slot_id,
            read: row.is_read,
            created_at: row.created_at,
        })
    }
}
