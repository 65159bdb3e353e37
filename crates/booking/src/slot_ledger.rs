//! Booking and releasing performance slots.
//!
//! The event document is written first with a conditional update; the
//! comedian's `performance_slots` back-reference is written second and a
//! failure there only gets logged (see [`crate::reconcile`]).

use std::sync::Arc;

use openmic_core::error::CoreError;
use openmic_core::event::Event;
use openmic_core::notification;
use openmic_core::slots;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;
use openmic_core::user::UserType;

use crate::dispatcher::NotificationDispatcher;
use crate::retry::modify_event;

#[derive(Clone)]
pub struct SlotLedger {
    store: Arc<dyn EntityStore>,
    dispatcher: NotificationDispatcher,
}

impl SlotLedger {
    pub fn new(store: Arc<dyn EntityStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Claim `slot_id` on `event_id` for `comedian_id`.
    ///
    /// Errors: `NotFound` (user, event or slot), `InvalidRole` (not a
    /// comedian), `Conflict` (slot already taken or event no longer live).
    pub async fn book_slot(
        &self,
        event_id: DbId,
        slot_id: DbId,
        comedian_id: DbId,
    ) -> Result<Event, CoreError> {
        let comedian = self
            .store
            .find_user(comedian_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(comedian_id))?;
        comedian.require_type(UserType::Comedian, "book performance slots")?;

        let (event, link) = modify_event(self.store.as_ref(), event_id, |event| {
            event.require_live()?;
            slots::claim_slot(event, slot_id, comedian_id)
        })
        .await?;

        tracing::info!(%event_id, %slot_id, %comedian_id, "Slot booked");

        if let Err(e) = self.store.add_performance_slot(comedian_id, link).await {
            tracing::warn!(
                error = %e,
                %event_id,
                %slot_id,
                %comedian_id,
                "Slot booked but performer back-reference was not written"
            );
        }

        if comedian.accepts_notifications() {
            if let Some(slot) = event.slot(slot_id) {
                self.dispatcher
                    .dispatch(&notification::slot_confirmed(&event, slot), &[comedian_id])
                    .await;
            }
        }

        Ok(event)
    }

    /// Release a slot held by `requester_id`.
    ///
    /// Errors: `NotFound` (event or slot), `Forbidden` (someone else's or
    /// an open slot).
    pub async fn cancel_slot(
        &self,
        event_id: DbId,
        slot_id: DbId,
        requester_id: DbId,
    ) -> Result<Event, CoreError> {
        let (event, link) = modify_event(self.store.as_ref(), event_id, |event| {
            slots::release_slot(event, slot_id, requester_id)
        })
        .await?;

        tracing::info!(%event_id, %slot_id, comedian_id = %requester_id, "Slot released");

        if let Err(e) = self.store.remove_performance_slot(requester_id, link).await {
            tracing::warn!(
                error = %e,
                %event_id,
                %slot_id,
                comedian_id = %requester_id,
                "Slot released but performer back-reference was not removed"
            );
        }

        Ok(event)
    }
}
