//! [`EntityStore`] backed by PostgreSQL.
//!
//! Every trait method maps onto one repository call and therefore one SQL
//! statement, which is what makes each of them atomic.

use async_trait::async_trait;
use openmic_core::event::{Event, EventStatus};
use openmic_core::notification::Notification;
use openmic_core::store::{EntityStore, StoreError, StoreResult};
use openmic_core::types::DbId;
use openmic_core::user::{NotificationPreferences, PerformanceSlotRef, User};

use crate::repositories::{EventRepo, NotificationRepo, UserRepo};
use crate::DbPool;

/// Entity store over a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgEntityStore {
    pool: DbPool,
}

impl PgEntityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Database error");
    if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::backend(err)
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        UserRepo::find_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        UserRepo::insert(&self.pool, user).await.map_err(backend)
    }

    async fn find_slot_alert_recipients(&self) -> StoreResult<Vec<User>> {
        UserRepo::list_slot_alert_recipients(&self.pool)
            .await
            .map_err(backend)
    }

    async fn update_notification_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> StoreResult<bool> {
        UserRepo::update_preferences(&self.pool, user_id, prefs)
            .await
            .map_err(backend)
    }

    async fn update_user_profile(&self, user: &User) -> StoreResult<bool> {
        UserRepo::update_profile(&self.pool, user)
            .await
            .map_err(backend)
    }

    async fn add_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        UserRepo::add_event_attending(&self.pool, user_id, event_id)
            .await
            .map_err(backend)
    }

    async fn remove_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        UserRepo::remove_event_attending(&self.pool, user_id, event_id)
            .await
            .map_err(backend)
    }

    async fn add_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool> {
        UserRepo::add_performance_slot(&self.pool, user_id, entry)
            .await
            .map_err(backend)
    }

    async fn remove_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool> {
        UserRepo::remove_performance_slot(&self.pool, user_id, entry)
            .await
            .map_err(backend)
    }

    async fn add_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        UserRepo::add_event_hosting(&self.pool, user_id, event_id)
            .await
            .map_err(backend)
    }

    async fn remove_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        UserRepo::remove_event_hosting(&self.pool, user_id, event_id)
            .await
            .map_err(backend)
    }

    async fn unlink_event(
        &self,
        event_id: DbId,
        attendee_ids: &[DbId],
        claimant_ids: &[DbId],
    ) -> StoreResult<u64> {
        UserRepo::unlink_event(&self.pool, event_id, attendee_ids, claimant_ids)
            .await
            .map_err(backend)
    }

    async fn replace_user_links(
        &self,
        user_id: DbId,
        events_attending: &[DbId],
        performance_slots: &[PerformanceSlotRef],
    ) -> StoreResult<bool> {
        UserRepo::replace_links(&self.pool, user_id, events_attending, performance_slots)
            .await
            .map_err(backend)
    }

    async fn find_event(&self, id: DbId) -> StoreResult<Option<Event>> {
        EventRepo::find_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn list_events(&self, status: Option<EventStatus>) -> StoreResult<Vec<Event>> {
        EventRepo::list(&self.pool, status).await.map_err(backend)
    }

    async fn find_events_involving(&self, user_id: DbId) -> StoreResult<Vec<Event>> {
        EventRepo::list_involving(&self.pool, user_id)
            .await
            .map_err(backend)
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        EventRepo::insert(&self.pool, event).await.map_err(backend)
    }

    async fn update_event(&self, event: &Event) -> StoreResult<bool> {
        EventRepo::update_if_version(&self.pool, event)
            .await
            .map_err(backend)
    }

    async fn delete_event(&self, event: &Event) -> StoreResult<bool> {
        EventRepo::delete_if_version(&self.pool, event.id, event.version)
            .await
            .map_err(backend)
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<u64> {
        NotificationRepo::insert_many(&self.pool, notifications)
            .await
            .map_err(backend)
    }

    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        NotificationRepo::list_for_recipient(&self.pool, recipient_id, unread_only, limit)
            .await
            .map_err(backend)
    }

    async fn find_notification(&self, id: DbId) -> StoreResult<Option<Notification>> {
        NotificationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)
    }

    async fn count_unread_notifications(&self, recipient_id: DbId) -> StoreResult<i64> {
        NotificationRepo::unread_count(&self.pool, recipient_id)
            .await
            .map_err(backend)
    }

    async fn mark_notification_read(&self, id: DbId) -> StoreResult<bool> {
        NotificationRepo::mark_read(&self.pool, id)
            .await
            .map_err(backend)
    }

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> StoreResult<u64> {
        NotificationRepo::mark_all_read(&self.pool, recipient_id)
            .await
            .map_err(backend)
    }

    async fn delete_notification(&self, id: DbId) -> StoreResult<bool> {
        NotificationRepo::delete(&self.pool, id)
            .await
            .map_err(backend)
    }
}
