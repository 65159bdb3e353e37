//! Read-modify-write loop over a single event document.

use openmic_core::error::CoreError;
use openmic_core::event::Event;
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;

/// Load the event, apply `mutate` to a fresh copy, and write it back
/// conditionally on the version that was read.
///
/// When another writer got there first the event is re-read and `mutate`
/// runs again against the new state, so its checks (slot still open, no
/// existing RSVP, ...) are always evaluated against what actually gets
/// written. A lost race means some other write committed, so the loop
/// only ends with a successful write or with an error from `mutate` or
/// the store. Returns the event as stored together with `mutate`'s output.
pub async fn modify_event<T, F>(
    store: &dyn EntityStore,
    event_id: DbId,
    mut mutate: F,
) -> Result<(Event, T), CoreError>
where
    F: FnMut(&mut Event) -> Result<T, CoreError> + Send,
    T: Send,
{
    let mut attempt: u32 = 1;
    loop {
        let mut event = store
            .find_event(event_id)
            .await?
            .ok_or_else(|| CoreError::event_not_found(event_id))?;

        let out = mutate(&mut event)?;
        event.updated_at = chrono::Utc::now();

        if store.update_event(&event).await? {
            event.version += 1;
            return Ok((event, out));
        }

        tracing::debug!(%event_id, attempt, "Event changed during write, retrying");
        attempt += 1;
    }
}
