//! Event lifecycle: creation, updates, status changes, cancellation and
//! deletion, plus the cascades they trigger on users and notifications.

use std::sync::Arc;

use openmic_core::error::CoreError;
use openmic_core::event::{Event, EventPatch, EventStatus, NewEvent};
use openmic_core::notification::{self, CascadeReason};
use openmic_core::store::{BlobStore, EntityStore};
use openmic_core::types::DbId;
use openmic_core::user::UserType;

use crate::dispatcher::NotificationDispatcher;
use crate::retry::modify_event;

#[derive(Clone)]
pub struct EventLifecycle {
    store: Arc<dyn EntityStore>,
    blobs: Arc<dyn BlobStore>,
    dispatcher: NotificationDispatcher,
}

impl EventLifecycle {
    pub fn new(
        store: Arc<dyn EntityStore>,
        blobs: Arc<dyn BlobStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            blobs,
            dispatcher,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find(&self, event_id: DbId) -> Result<Event, CoreError> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or_else(|| CoreError::event_not_found(event_id))
    }

    pub async fn list(&self, status: Option<EventStatus>) -> Result<Vec<Event>, CoreError> {
        Ok(self.store.list_events(status).await?)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Publish a new upcoming event for `input.host_id`.
    ///
    /// Comedians with slot alerts enabled are told about it when it has
    /// at least one open slot.
    pub async fn create(&self, input: NewEvent) -> Result<Event, CoreError> {
        let host = self
            .store
            .find_user(input.host_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(input.host_id))?;
        host.require_type(UserType::Host, "create events")?;

        let event = Event::new(input)?;
        self.store.insert_event(&event).await?;

        tracing::info!(
            event_id = %event.id,
            host_id = %host.id,
            slots = event.time_slots.len(),
            "Event created"
        );

        if let Err(e) = self.store.add_event_hosting(host.id, event.id).await {
            tracing::warn!(
                error = %e,
                event_id = %event.id,
                host_id = %host.id,
                "Event created but host back-reference was not written"
            );
        }

        if event.available_slot_count() > 0 {
            let comedians = self.dispatcher.slot_alert_recipients().await;
            self.dispatcher
                .notify_available_slots(&notification::new_event_slots(&event), &comedians)
                .await;
        }

        Ok(event)
    }

    /// Apply a host's patch.
    ///
    /// Setting the status to `cancelled` runs the cancellation cascade.
    /// Otherwise new open slots are announced to comedians and a moved
    /// venue or schedule is announced to the roster.
    pub async fn update(
        &self,
        event_id: DbId,
        requester_id: DbId,
        patch: EventPatch,
    ) -> Result<Event, CoreError> {
        patch.check()?;

        let (event, outcome) = modify_event(self.store.as_ref(), event_id, |event| {
            event.require_host(requester_id, "update")?;
            patch.apply(event)
        })
        .await?;

        tracing::info!(
            %event_id,
            status = %event.status,
            slots_added = outcome.slots_added,
            schedule_changed = outcome.schedule_changed,
            "Event updated"
        );

        if outcome.cancelled {
            self.cancel_event(&event).await;
            return Ok(event);
        }

        if outcome.slots_added > 0 {
            let comedians = self.dispatcher.slot_alert_recipients().await;
            self.dispatcher
                .notify_available_slots(
                    &notification::slots_added(&event, outcome.slots_added),
                    &comedians,
                )
                .await;
        }

        if outcome.schedule_changed && !event.status.is_terminal() {
            self.dispatcher.notify_schedule_change(&event).await;
        }

        Ok(event)
    }

    /// Move an event along the status machine without a host check.
    ///
    /// Entry point for the scheduler that marks events ongoing and completed.
    pub async fn set_status(&self, event_id: DbId, status: EventStatus) -> Result<Event, CoreError> {
        let (event, cancelled) = modify_event(self.store.as_ref(), event_id, |event| {
            event.status.check_transition(status)?;
            let cancelled = status == EventStatus::Cancelled && event.status != status;
            event.status = status;
            Ok(cancelled)
        })
        .await?;

        tracing::info!(%event_id, %status, "Event status set");

        if cancelled {
            self.cancel_event(&event).await;
        }

        Ok(event)
    }

    /// Cascade for an event that was just written as `cancelled`.
    ///
    /// The roster stays on the event document; every affected user is
    /// notified and unlinked. Failures are logged and do not undo the
    /// cancellation.
    pub async fn cancel_event(&self, event: &Event) {
        let attendees = event.attendee_ids();
        let claimants = event.claimant_ids();

        self.dispatcher
            .notify_cascade(event, CascadeReason::Cancelled)
            .await;

        match self
            .store
            .unlink_event(event.id, &attendees, &claimants)
            .await
        {
            Ok(touched) => tracing::info!(event_id = %event.id, users = touched, "Event cancelled"),
            Err(e) => tracing::warn!(
                error = %e,
                event_id = %event.id,
                "Event cancelled but user back-references were not all removed"
            ),
        }
    }

    /// Delete an event and everything that points at it.
    ///
    /// Users are unlinked before the document is removed, and the removal
    /// only succeeds at the version the roster was read from. If a booking
    /// or RSVP lands in between, the event is re-read and the newcomers are
    /// unlinked too. If unlinking fails the event is left in place and the
    /// error returned, so the call can be repeated. The roster is notified
    /// once the document is gone and the image blob is removed last,
    /// best-effort.
    pub async fn delete(&self, event_id: DbId, requester_id: DbId) -> Result<(), CoreError> {
        let mut event = self.find(event_id).await?;
        event.require_host(requester_id, "delete")?;

        self.store
            .remove_event_hosting(event.host_id, event.id)
            .await?;

        loop {
            self.store
                .unlink_event(event.id, &event.attendee_ids(), &event.claimant_ids())
                .await?;

            if self.store.delete_event(&event).await? {
                break;
            }

            tracing::debug!(%event_id, "Event changed during delete, unlinking again");
            event = self.find(event_id).await?;
        }

        tracing::info!(%event_id, "Event deleted");

        self.dispatcher
            .notify_cascade(&event, CascadeReason::Deleted)
            .await;

        if let Some(image) = &event.image {
            self.discard_blob(image).await;
        }

        Ok(())
    }

    /// Replace the event's image with a freshly uploaded one.
    pub async fn replace_image(
        &self,
        event_id: DbId,
        requester_id: DbId,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Event, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Validation("Image body is empty".into()));
        }
        if !content_type.starts_with("image/") {
            return Err(CoreError::Validation(
                "Only image uploads are allowed".into(),
            ));
        }

        self.find(event_id).await?.require_host(requester_id, "update")?;

        let filename = self.blobs.put(bytes, content_type).await?;

        let written = modify_event(self.store.as_ref(), event_id, |event| {
            event.require_host(requester_id, "update")?;
            Ok(event.image.replace(filename.clone()))
        })
        .await;

        let (event, previous) = match written {
            Ok(w) => w,
            Err(e) => {
                self.discard_blob(&filename).await;
                return Err(e);
            }
        };

        tracing::info!(%event_id, image = %filename, "Event image replaced");

        if let Some(old) = previous.filter(|old| *old != filename) {
            self.discard_blob(&old).await;
        }

        Ok(event)
    }

    async fn discard_blob(&self, filename: &str) {
        if let Err(e) = self.blobs.delete(filename).await {
            tracing::warn!(error = %e, image = filename, "Failed to delete image blob");
        }
    }
}
