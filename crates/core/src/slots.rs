//! Slot ledger rules applied to an in-memory [`Event`] aggregate.
//!
//! These functions only mutate the event document. Persisting it (and the
//! comedian's back-reference) is the booking service's job.

use crate::error::CoreError;
use crate::event::{Event, SlotSpec, TimeSlot};
use crate::types::DbId;
use crate::user::PerformanceSlotRef;

/// Give a free slot to `comedian_id`.
///
/// Returns the back-reference to append to the comedian's performance slots.
pub fn claim_slot(
    event: &mut Event,
    slot_id: DbId,
    comedian_id: DbId,
) -> Result<PerformanceSlotRef, CoreError> {
    let event_id = event.id;
    let slot = event
        .slot_mut(slot_id)
        .ok_or_else(|| CoreError::slot_not_found(slot_id))?;

    if !slot.is_open() {
        return Err(CoreError::Conflict("This slot is already taken".into()));
    }

    slot.claim(comedian_id);
    Ok(PerformanceSlotRef { event_id, slot_id })
}

/// Free a slot held by `requester_id`.
///
/// Returns the back-reference to remove from the comedian's performance slots.
pub fn release_slot(
    event: &mut Event,
    slot_id: DbId,
    requester_id: DbId,
) -> Result<PerformanceSlotRef, CoreError> {
    let event_id = event.id;
    let slot = event
        .slot_mut(slot_id)
        .ok_or_else(|| CoreError::slot_not_found(slot_id))?;

    if slot.claimant != Some(requester_id) {
        return Err(CoreError::Forbidden("You did not book this slot".into()));
    }

    slot.release();
    Ok(PerformanceSlotRef { event_id, slot_id })
}

/// Replace every open slot with `specs`, keeping taken slots untouched.
///
/// Taken slots keep their id, claimant and order. New slots are numbered
/// from `taken + 1` in the order given. A spec carrying the id of a kept
/// slot is skipped. Returns the number of slots added.
pub fn replace_open_slots(event: &mut Event, specs: &[SlotSpec]) -> usize {
    event.time_slots.retain(|s| s.is_taken);
    let taken = event.time_slots.len();

    let fresh: Vec<TimeSlot> = specs
        .iter()
        .filter(|spec| match spec.id {
            Some(id) => event.slot(id).is_none(),
            None => true,
        })
        .zip((taken as i32 + 1)..)
        .map(|(spec, order)| TimeSlot::open(spec, order))
        .collect();

    let added = fresh.len();
    event.time_slots.extend(fresh);
    added
}

/// Every back-reference the event implies for `comedian_id`.
pub fn slots_held_by(event: &Event, comedian_id: DbId) -> Vec<PerformanceSlotRef> {
    event
        .time_slots
        .iter()
        .filter(|s| s.claimant == Some(comedian_id))
        .map(|s| PerformanceSlotRef {
            event_id: event.id,
            slot_id: s.id,
        })
        .collect()
}
