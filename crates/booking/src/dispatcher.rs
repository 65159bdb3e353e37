//! Best-effort notification fan-out.
//!
//! Nothing in here returns an error. A failed insert is logged and dropped
//! so the operation that triggered it still succeeds.

use std::sync::Arc;

use openmic_core::event::Event;
use openmic_core::notification::{self, CascadeReason, NotificationDraft};
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;

#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn EntityStore>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Insert one notification per recipient. Returns how many were stored.
    pub async fn dispatch(&self, draft: &NotificationDraft, recipients: &[DbId]) -> u64 {
        if recipients.is_empty() {
            return 0;
        }

        let batch: Vec<_> = recipients
            .iter()
            .map(|id| draft.for_recipient(*id))
            .collect();

        match self.store.insert_notifications(&batch).await {
            Ok(n) => {
                tracing::debug!(kind = %draft.kind, recipients = n, "Notifications dispatched");
                n
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = %draft.kind,
                    recipients = recipients.len(),
                    "Failed to store notifications"
                );
                0
            }
        }
    }

    /// Send to a single user if their preferences allow it.
    pub async fn notify_user(&self, user_id: DbId, draft: &NotificationDraft) -> u64 {
        match self.store.find_user(user_id).await {
            Ok(Some(user)) if user.accepts_notifications() => {
                self.dispatch(draft, &[user_id]).await
            }
            Ok(_) => 0,
            Err(e) => {
                tracing::warn!(error = %e, %user_id, "Failed to load notification recipient");
                0
            }
        }
    }

    /// Comedians that opted into slot alerts. Empty on store failure.
    pub async fn slot_alert_recipients(&self) -> Vec<DbId> {
        match self.store.find_slot_alert_recipients().await {
            Ok(users) => users.into_iter().map(|u| u.id).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load slot alert recipients");
                Vec::new()
            }
        }
    }

    /// One `slot_available` notification per comedian. Empty set is a no-op.
    pub async fn notify_available_slots(
        &self,
        draft: &NotificationDraft,
        comedians: &[DbId],
    ) -> u64 {
        self.dispatch(draft, comedians).await
    }

    /// Tell every attendee and every booked comedian that the event is gone.
    pub async fn notify_cascade(&self, event: &Event, reason: CascadeReason) -> u64 {
        let attendees = self
            .dispatch(
                &notification::attendee_cascade(event, reason),
                &event.attendee_ids(),
            )
            .await;
        let performers = self
            .dispatch(
                &notification::performer_cascade(event, reason),
                &event.claimant_ids(),
            )
            .await;
        attendees + performers
    }

    /// Tell attendees and booked comedians that the venue or schedule moved.
    pub async fn notify_schedule_change(&self, event: &Event) -> u64 {
        let mut recipients = event.attendee_ids();
        for id in event.claimant_ids() {
            if !recipients.contains(&id) {
                recipients.push(id);
            }
        }
        self.dispatch(&notification::event_updated(event), &recipients)
            .await
    }
}
