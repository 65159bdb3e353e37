//! Domain model and invariant rules for the open-mic booking platform.
//!
//! Everything in this crate is storage-agnostic: the aggregate types, the
//! pure slot/attendance mutations, the event status machine, notification
//! wording, and the [`store::EntityStore`] seam the booking services are
//! written against.

pub mod attendance;
pub mod error;
pub mod event;
pub mod memory;
pub mod notification;
pub mod slots;
pub mod store;
pub mod types;
pub mod user;
