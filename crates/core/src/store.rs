//! Storage seams consumed by the booking services.
//!
//! [`EntityStore`] is a document store: each user and each event (with its
//! embedded slots and attendance) is updated atomically as a whole. There
//! are no multi-document transactions. [`EntityStore::update_event`] is the
//! only conditional write and is what the slot ledger relies on to resolve
//! concurrent bookings.

use async_trait::async_trait;

use crate::event::{Event, EventStatus};
use crate::notification::Notification;
use crate::types::DbId;
use crate::user::{NotificationPreferences, PerformanceSlotRef, User};

/// Failure of the storage backend itself (unreachable, corrupt row, ...).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wrap any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users ---

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Comedians with both `enable_notifications` and `available_slot_alerts` on.
    async fn find_slot_alert_recipients(&self) -> StoreResult<Vec<User>>;

    async fn update_notification_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> StoreResult<bool>;

    /// Write the profile fields (`name`, `bio`, `profile_picture`) of `user`.
    async fn update_user_profile(&self, user: &User) -> StoreResult<bool>;

    /// Add to `events_attending` unless already present.
    async fn add_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool>;

    async fn remove_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool>;

    /// Append to `performance_slots` unless an identical entry exists.
    async fn add_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool>;

    async fn remove_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool>;

    async fn add_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool>;

    async fn remove_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool>;

    /// Bulk unlink: pull `event_id` from every attendee's `events_attending`
    /// and every performance-slot entry for `event_id` from every claimant.
    ///
    /// Returns the number of user documents touched.
    async fn unlink_event(
        &self,
        event_id: DbId,
        attendee_ids: &[DbId],
        claimant_ids: &[DbId],
    ) -> StoreResult<u64>;

    /// Overwrite both back-reference lists of a user.
    async fn replace_user_links(
        &self,
        user_id: DbId,
        events_attending: &[DbId],
        performance_slots: &[PerformanceSlotRef],
    ) -> StoreResult<bool>;

    // --- Events ---

    async fn find_event(&self, id: DbId) -> StoreResult<Option<Event>>;

    /// Events ordered by date, optionally filtered by status.
    async fn list_events(&self, status: Option<EventStatus>) -> StoreResult<Vec<Event>>;

    /// Events where the user holds a slot or an attendance entry.
    async fn find_events_involving(&self, user_id: DbId) -> StoreResult<Vec<Event>>;

    async fn insert_event(&self, event: &Event) -> StoreResult<()>;

    /// Write `event` iff the stored version still equals `event.version`.
    ///
    /// On success the stored version becomes `event.version + 1`. Returns
    /// `false` when the document changed since it was read (or is gone).
    async fn update_event(&self, event: &Event) -> StoreResult<bool>;

    /// Delete iff the stored version still equals `event.version`.
    ///
    /// Returns `false` when the document changed since it was read (or is gone).
    async fn delete_event(&self, event: &Event) -> StoreResult<bool>;

    // --- Notifications ---

    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<u64>;

    /// Newest first.
    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> StoreResult<Vec<Notification>>;

    async fn find_notification(&self, id: DbId) -> StoreResult<Option<Notification>>;

    async fn count_unread_notifications(&self, recipient_id: DbId) -> StoreResult<i64>;

    async fn mark_notification_read(&self, id: DbId) -> StoreResult<bool>;

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> StoreResult<u64>;

    async fn delete_notification(&self, id: DbId) -> StoreResult<bool>;
}

/// Binary object storage for event images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` and return the generated filename.
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;

    async fn delete(&self, filename: &str) -> StoreResult<()>;
}
