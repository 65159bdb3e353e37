//! Repository for the `notifications` table.

use openmic_core::notification::Notification;
use openmic_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::notification::NotificationRow;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, recipient_id, notification_type, title, message, event_id, \
    time_slot_id, is_read, created_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a batch of notifications in one statement.
    ///
    /// Returns the number of rows inserted.
    pub async fn insert_many(
        pool: &PgPool,
        notifications: &[Notification],
    ) -> Result<u64, sqlx::Error> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO notifications (id, recipient_id, notification_type, title, message, \
                 event_id, time_slot_id, is_read, created_at) ",
        );
        builder.push_values(notifications, |mut row, n| {
            row.push_bind(n.id)
                .push_bind(n.recipient_id)
                .push_bind(n.kind.as_str())
                .push_bind(&n.title)
                .push_bind(&n.message)
                .push_bind(n.event_id)
                .push_bind(n.time_slot_id)
                .push_bind(n.read)
                .push_bind(n.created_at);
        });

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// List notifications for a recipient, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(recipient_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Notification::try_from)
            .transpose()
    }

    /// Get the number of unread notifications for a recipient.
    pub async fn unread_count(pool: &PgPool, recipient_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Mark a single notification as read. Returns `true` if the row exists.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a recipient.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, recipient_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true \
             WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
