//! RSVPs. Same write order as the slot ledger: event first, user second.

use std::sync::Arc;

use openmic_core::attendance;
use openmic_core::error::CoreError;
use openmic_core::event::Event;
use openmic_core::notification;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;

use crate::dispatcher::NotificationDispatcher;
use crate::retry::modify_event;

#[derive(Clone)]
pub struct AttendanceLedger {
    store: Arc<dyn EntityStore>,
    dispatcher: NotificationDispatcher,
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn EntityStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// RSVP `user_id` to `event_id` with an optional free-text note.
    pub async fn rsvp(
        &self,
        event_id: DbId,
        user_id: DbId,
        note: Option<&str>,
    ) -> Result<Event, CoreError> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(user_id))?;

        let (event, _) = modify_event(self.store.as_ref(), event_id, |event| {
            event.require_live()?;
            attendance::add_attendee(event, user_id, note)
        })
        .await?;

        tracing::info!(%event_id, %user_id, "RSVP recorded");

        if let Err(e) = self.store.add_event_attending(user_id, event_id).await {
            tracing::warn!(
                error = %e,
                %event_id,
                %user_id,
                "RSVP recorded but attendee back-reference was not written"
            );
        }

        self.dispatcher
            .notify_user(
                event.host_id,
                &notification::new_attendee(&event, &user.name),
            )
            .await;

        Ok(event)
    }

    pub async fn cancel_rsvp(&self, event_id: DbId, user_id: DbId) -> Result<Event, CoreError> {
        let (event, _) = modify_event(self.store.as_ref(), event_id, |event| {
            attendance::remove_attendee(event, user_id)
        })
        .await?;

        tracing::info!(%event_id, %user_id, "RSVP cancelled");

        if let Err(e) = self.store.remove_event_attending(user_id, event_id).await {
            tracing::warn!(
                error = %e,
                %event_id,
                %user_id,
                "RSVP cancelled but attendee back-reference was not removed"
            );
        }

        Ok(event)
    }
}
