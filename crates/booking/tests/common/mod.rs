#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use openmic_booking::BookingServices;
use openmic_core::event::{Address, Event, GeoPoint, NewEvent, SlotSpec};
use openmic_core::memory::{MemoryBlobStore, MemoryStore};
use openmic_core::notification::{Notification, NotificationType};
use openmic_core::store::EntityStore;
use openmic_core::types::DbId;
use openmic_core::user::{NewUser, User, UserType};

/// Services wired to in-memory stores, with direct handles on both stores
/// for fault injection and inspection.
pub struct Harness {
    pub store: MemoryStore,
    pub blobs: MemoryBlobStore,
    pub services: BookingServices,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let blobs = MemoryBlobStore::new();
        let services = BookingServices::new(Arc::new(store.clone()), Arc::new(blobs.clone()));
        Self {
            store,
            blobs,
            services,
        }
    }

    pub async fn user(&self, name: &str, user_type: UserType) -> User {
        let user = User::new(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "not-a-real-hash".to_string(),
            user_type,
        });
        self.store.insert_user(&user).await.unwrap();
        user
    }

    pub async fn host(&self) -> User {
        self.user("Hana", UserType::Host).await
    }

    pub async fn comedian(&self, name: &str) -> User {
        self.user(name, UserType::Comedian).await
    }

    pub async fn guest(&self, name: &str) -> User {
        self.user(name, UserType::Guest).await
    }

    /// Create an event with `slots` open slots through the lifecycle service.
    pub async fn event(&self, host: &User, slots: usize) -> Event {
        self.services
            .events
            .create(new_event(host.id, slots))
            .await
            .unwrap()
    }

    pub async fn reload_event(&self, id: DbId) -> Event {
        self.store.find_event(id).await.unwrap().unwrap()
    }

    pub async fn reload_user(&self, id: DbId) -> User {
        self.store.find_user(id).await.unwrap().unwrap()
    }

    pub async fn notifications_for(&self, recipient: DbId) -> Vec<Notification> {
        self.store
            .all_notifications()
            .await
            .into_iter()
            .filter(|n| n.recipient_id == recipient)
            .collect()
    }

    pub async fn notifications_of(&self, kind: NotificationType) -> Vec<Notification> {
        self.store
            .all_notifications()
            .await
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 20, hour, 0, 0).unwrap()
}

pub fn slot_spec(start_hour: u32) -> SlotSpec {
    SlotSpec {
        id: None,
        start_time: at(start_hour),
        end_time: at(start_hour) + Duration::minutes(10),
    }
}

pub fn new_event(host_id: DbId, slots: usize) -> NewEvent {
    NewEvent {
        host_id,
        name: "Tuesday Open Mic".to_string(),
        description: "Sign up for five minutes".to_string(),
        venue: "The Cellar".to_string(),
        address: Address {
            street: "1 Main St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip_code: "78701".to_string(),
        },
        location: GeoPoint {
            longitude: -97.74,
            latitude: 30.27,
        },
        date: at(0),
        start_time: at(18),
        end_time: at(23),
        image: None,
        time_slots: (0..slots).map(|i| slot_spec(18 + i as u32)).collect(),
    }
}
