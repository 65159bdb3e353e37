//! Booking services for the open-mic platform.
//!
//! Each service holds an `Arc<dyn EntityStore>` and implements one area of
//! the domain on top of the pure rules in `openmic-core`. None of them hold
//! state of their own, so they are cheap to clone into request handlers.

pub mod attendance_ledger;
pub mod dispatcher;
pub mod inbox;
pub mod lifecycle;
pub mod reconcile;
pub mod retry;
pub mod slot_ledger;
pub mod users;

use std::sync::Arc;

use openmic_core::store::{BlobStore, EntityStore};

pub use attendance_ledger::AttendanceLedger;
pub use dispatcher::NotificationDispatcher;
pub use inbox::NotificationInbox;
pub use lifecycle::EventLifecycle;
pub use reconcile::Reconciler;
pub use slot_ledger::SlotLedger;
pub use users::UserDirectory;

/// All booking services wired to one store.
#[derive(Clone)]
pub struct BookingServices {
    pub slots: SlotLedger,
    pub attendance: AttendanceLedger,
    pub events: EventLifecycle,
    pub notifications: NotificationDispatcher,
    pub inbox: NotificationInbox,
    pub reconciler: Reconciler,
    pub users: UserDirectory,
}

impl BookingServices {
    pub fn new(store: Arc<dyn EntityStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let dispatcher = NotificationDispatcher::new(Arc::clone(&store));
        Self {
            slots: SlotLedger::new(Arc::clone(&store), dispatcher.clone()),
            attendance: AttendanceLedger::new(Arc::clone(&store), dispatcher.clone()),
            events: EventLifecycle::new(Arc::clone(&store), blobs, dispatcher.clone()),
            inbox: NotificationInbox::new(Arc::clone(&store)),
            reconciler: Reconciler::new(Arc::clone(&store)),
            users: UserDirectory::new(store),
            notifications: dispatcher,
        }
    }
}
