//! Rebuild a user's back-reference lists from the event documents.
//!
//! Events own the truth about slots and attendance. A user-side write that
//! failed after its event write succeeded leaves the user's lists stale;
//! running the reconciler for that user repairs them. Cancelled events are
//! skipped because cancellation already unlinks its roster.

use std::sync::Arc;

use openmic_core::error::CoreError;
use openmic_core::event::EventStatus;
use openmic_core::slots;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;
use openmic_core::user::User;

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn EntityStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Overwrite `events_attending` and `performance_slots` for `user_id`
    /// with what the live events say. Returns the repaired user.
    pub async fn reconcile_user(&self, user_id: DbId) -> Result<User, CoreError> {
        let mut user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(user_id))?;

        let events = self.store.find_events_involving(user_id).await?;

        let mut attending = Vec::new();
        let mut performing = Vec::new();
        for event in events.iter().filter(|e| e.status != EventStatus::Cancelled) {
            if event.attendance_for(user_id).is_some() {
                attending.push(event.id);
            }
            performing.extend(slots::slots_held_by(event, user_id));
        }

        let changed = user.events_attending != attending || user.performance_slots != performing;
        if changed {
            if !self
                .store
                .replace_user_links(user_id, &attending, &performing)
                .await?
            {
                return Err(CoreError::user_not_found(user_id));
            }
            tracing::info!(
                %user_id,
                events_attending = attending.len(),
                performance_slots = performing.len(),
                "User back-references rebuilt"
            );
        }

        user.events_attending = attending;
        user.performance_slots = performing;
        Ok(user)
    }
}
