//! Integration tests for `PgEntityStore` against a real database.
//!
//! Run with `DATABASE_URL` pointing at a disposable PostgreSQL server:
//! `cargo test -p openmic-db -- --ignored`.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use openmic_booking::{BookingServices, EventLifecycle, SlotLedger};
use openmic_core::event::{Address, Event, EventPatch, EventStatus, GeoPoint, NewEvent, SlotSpec};
use openmic_core::memory::MemoryBlobStore;
use openmic_core::notification::NotificationType;
use openmic_core::store::EntityStore;
use openmic_core::types::{new_id, DbId};
use openmic_core::user::{NewUser, PerformanceSlotRef, User, UserType};
use openmic_db::PgEntityStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(store: &PgEntityStore, name: &str, user_type: UserType) -> User {
    let user = User::new(NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "hash".to_string(),
        user_type,
    });
    store.insert_user(&user).await.unwrap();
    user
}

fn new_event(host_id: DbId, slots: u32) -> NewEvent {
    let at = |h: u32| Utc.with_ymd_and_hms(2026, 11, 20, h, 0, 0).unwrap();
    NewEvent {
        host_id,
        name: "Tuesday Open Mic".to_string(),
        description: "Five minutes each".to_string(),
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
        time_slots: (0..slots)
            .map(|i| SlotSpec {
                id: None,
                start_time: at(18 + i),
                end_time: at(18 + i) + Duration::minutes(10),
            })
            .collect(),
    }
}

fn services(store: &PgEntityStore) -> BookingServices {
    BookingServices::new(Arc::new(store.clone()), Arc::new(MemoryBlobStore::new()))
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn event_round_trips_with_embedded_slots(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let host = user(&store, "Hana", UserType::Host).await;
    let event = Event::new(new_event(host.id, 3)).unwrap();

    store.insert_event(&event).await.unwrap();
    let loaded = store.find_event(event.id).await.unwrap().unwrap();

    assert_eq!(loaded.time_slots, event.time_slots);
    assert_eq!(loaded.address, event.address);
    assert_eq!(loaded.status, EventStatus::Upcoming);
    assert_eq!(loaded.version, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stale_version_write_is_rejected(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let host = user(&store, "Hana", UserType::Host).await;
    let event = Event::new(new_event(host.id, 1)).unwrap();
    store.insert_event(&event).await.unwrap();

    let mut first = event.clone();
    first.name = "First".into();
    assert!(store.update_event(&first).await.unwrap());

    let mut stale = event.clone();
    stale.name = "Stale".into();
    assert!(!store.update_event(&stale).await.unwrap());

    let stored = store.find_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "First");
    assert_eq!(stored.version, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stale_version_delete_is_rejected(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let host = user(&store, "Hana", UserType::Host).await;
    let event = Event::new(new_event(host.id, 1)).unwrap();
    store.insert_event(&event).await.unwrap();
    assert!(store.update_event(&event).await.unwrap());

    assert!(!store.delete_event(&event).await.unwrap());
    let current = store.find_event(event.id).await.unwrap().unwrap();
    assert!(store.delete_event(&current).await.unwrap());
    assert!(store.find_event(event.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn back_reference_arrays_have_set_semantics(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let comic = user(&store, "Cleo", UserType::Comedian).await;
    let event_id = new_id();
    let entry = PerformanceSlotRef {
        event_id,
        slot_id: new_id(),
    };

    assert!(store.add_event_attending(comic.id, event_id).await.unwrap());
    assert!(store.add_event_attending(comic.id, event_id).await.unwrap());
    assert!(store.add_performance_slot(comic.id, entry).await.unwrap());
    assert!(store.add_performance_slot(comic.id, entry).await.unwrap());

    let stored = store.find_user(comic.id).await.unwrap().unwrap();
    assert_eq!(stored.events_attending, vec![event_id]);
    assert_eq!(stored.performance_slots, vec![entry]);

    assert!(store.remove_performance_slot(comic.id, entry).await.unwrap());
    assert!(!store.remove_performance_slot(comic.id, entry).await.unwrap());
    assert!(store.remove_event_attending(comic.id, event_id).await.unwrap());
    let stored = store.find_user(comic.id).await.unwrap().unwrap();
    assert!(stored.events_attending.is_empty());
    assert!(stored.performance_slots.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unlink_event_keeps_other_events(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let guest = user(&store, "Gus", UserType::Guest).await;
    let comic = user(&store, "Cleo", UserType::Comedian).await;
    let (gone, kept) = (new_id(), new_id());
    let gone_slot = PerformanceSlotRef {
        event_id: gone,
        slot_id: new_id(),
    };
    let kept_slot = PerformanceSlotRef {
        event_id: kept,
        slot_id: new_id(),
    };
    store.add_event_attending(guest.id, gone).await.unwrap();
    store.add_event_attending(guest.id, kept).await.unwrap();
    store.add_performance_slot(comic.id, gone_slot).await.unwrap();
    store.add_performance_slot(comic.id, kept_slot).await.unwrap();

    let touched = store
        .unlink_event(gone, &[guest.id], &[comic.id])
        .await
        .unwrap();

    assert_eq!(touched, 2);
    let guest = store.find_user(guest.id).await.unwrap().unwrap();
    let comic = store.find_user(comic.id).await.unwrap().unwrap();
    assert_eq!(guest.events_attending, vec![kept]);
    assert_eq!(comic.performance_slots, vec![kept_slot]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn slot_alert_recipients_respect_preferences(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let keen = user(&store, "Keen", UserType::Comedian).await;
    let quiet = user(&store, "Quiet", UserType::Comedian).await;
    user(&store, "Gus", UserType::Guest).await;
    let mut prefs = quiet.notification_preferences.clone();
    prefs.available_slot_alerts = false;
    store
        .update_notification_preferences(quiet.id, &prefs)
        .await
        .unwrap();

    let ids: Vec<DbId> = store
        .find_slot_alert_recipients()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();

    assert_eq!(ids, vec![keen.id]);
}

// ---------------------------------------------------------------------------
// Services over PostgreSQL
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_bookings_have_one_winner(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let host = user(&store, "Hana", UserType::Host).await;
    let a = user(&store, "Abe", UserType::Comedian).await;
    let b = user(&store, "Bea", UserType::Comedian).await;
    let svc = services(&store);
    let event = svc.events.create(new_event(host.id, 1)).await.unwrap();
    let slot_id = event.time_slots[0].id;

    let ledger: &SlotLedger = &svc.slots;
    let (ra, rb) = tokio::join!(
        ledger.book_slot(event.id, slot_id, a.id),
        ledger.book_slot(event.id, slot_id, b.id),
    );

    assert_eq!(usize::from(ra.is_ok()) + usize::from(rb.is_ok()), 1);
    let winner = if ra.is_ok() { a.id } else { b.id };
    let stored = store.find_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.time_slots[0].claimant, Some(winner));
    assert!(stored.time_slots[0].is_taken);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn cancel_cascade_unlinks_and_notifies(pool: PgPool) {
    let store = PgEntityStore::new(pool);
    let host = user(&store, "Hana", UserType::Host).await;
    let g1 = user(&store, "Gus", UserType::Guest).await;
    let g2 = user(&store, "Gia", UserType::Guest).await;
    let comic = user(&store, "Cleo", UserType::Comedian).await;
    let svc = services(&store);
    let lifecycle: &EventLifecycle = &svc.events;
    let event = lifecycle.create(new_event(host.id, 2)).await.unwrap();
    svc.attendance.rsvp(event.id, g1.id, None).await.unwrap();
    svc.attendance.rsvp(event.id, g2.id, None).await.unwrap();
    svc.slots
        .book_slot(event.id, event.time_slots[0].id, comic.id)
        .await
        .unwrap();

    let cancelled = lifecycle
        .update(
            event.id,
            host.id,
            EventPatch {
                status: Some(EventStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, EventStatus::Cancelled);
    for id in [g1.id, g2.id] {
        let u = store.find_user(id).await.unwrap().unwrap();
        assert!(!u.events_attending.contains(&event.id));
        let inbox = store.list_notifications(id, false, 50).await.unwrap();
        assert_eq!(inbox[0].kind, NotificationType::EventCancelled);
    }
    let comic = store.find_user(comic.id).await.unwrap().unwrap();
    assert!(comic.performance_slots.iter().all(|p| p.event_id != event.id));
}
