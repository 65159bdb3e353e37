//! A user's own notifications.

use std::sync::Arc;

use openmic_core::error::CoreError;
use openmic_core::notification::Notification;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;

/// Maximum number of notifications returned by one listing.
pub const INBOX_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct NotificationInbox {
    store: Arc<dyn EntityStore>,
}

impl NotificationInbox {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Newest first, at most [`INBOX_LIMIT`].
    pub async fn list(
        &self,
        recipient_id: DbId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, CoreError> {
        Ok(self
            .store
            .list_notifications(recipient_id, unread_only, INBOX_LIMIT)
            .await?)
    }

    pub async fn unread_count(&self, recipient_id: DbId) -> Result<i64, CoreError> {
        Ok(self.store.count_unread_notifications(recipient_id).await?)
    }

    pub async fn mark_read(
        &self,
        notification_id: DbId,
        requester_id: DbId,
    ) -> Result<Notification, CoreError> {
        let mut notification = self.owned(notification_id, requester_id).await?;
        if !self.store.mark_notification_read(notification_id).await? {
            return Err(not_found(notification_id));
        }
        notification.read = true;
        Ok(notification)
    }

    /// Returns how many notifications changed.
    pub async fn mark_all_read(&self, recipient_id: DbId) -> Result<u64, CoreError> {
        let marked = self.store.mark_all_notifications_read(recipient_id).await?;
        tracing::debug!(%recipient_id, marked, "Notifications marked read");
        Ok(marked)
    }

    pub async fn delete(&self, notification_id: DbId, requester_id: DbId) -> Result<(), CoreError> {
        self.owned(notification_id, requester_id).await?;
        if !self.store.delete_notification(notification_id).await? {
            return Err(not_found(notification_id));
        }
        Ok(())
    }

    async fn owned(
        &self,
        notification_id: DbId,
        requester_id: DbId,
    ) -> Result<Notification, CoreError> {
        let notification = self
            .store
            .find_notification(notification_id)
            .await?
            .ok_or_else(|| not_found(notification_id))?;

        if notification.recipient_id != requester_id {
            return Err(CoreError::Forbidden(
                "Not authorized to modify this notification".into(),
            ));
        }
        Ok(notification)
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Notification",
        id,
    }
}
