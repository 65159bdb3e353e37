//! In-memory [`EntityStore`] and [`BlobStore`] implementations.
//!
//! Used by tests and local development. Semantics match the PostgreSQL
//! store: each method is atomic with respect to the others, and
//! [`EntityStore::update_event`] compares versions under the write lock.
//!
//! Individual write paths can be made to fail on demand so callers can
//! verify how they handle partial failures.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::event::{Event, EventStatus};
use crate::notification::Notification;
use crate::store::{BlobStore, EntityStore, StoreError, StoreResult};
use crate::types::{new_id, DbId};
use crate::user::{NotificationPreferences, PerformanceSlotRef, User};

type Interleave = Box<dyn FnOnce(&mut Event, &mut HashMap<DbId, User>) + Send + Sync>;

/// A write from "another request", run inside the next `delete_event`.
#[derive(Default)]
struct BeforeDelete(Option<Interleave>);

impl fmt::Debug for BeforeDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "armed" } else { "none" })
    }
}

#[derive(Debug, Default)]
struct Documents {
    users: HashMap<DbId, User>,
    events: HashMap<DbId, Event>,
    notifications: Vec<Notification>,
    before_delete: BeforeDelete,
}

#[derive(Debug, Default)]
struct Faults {
    user_links: AtomicBool,
    notifications: AtomicBool,
}

/// HashMap-backed entity store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<Documents>>,
    faults: Arc<Faults>,
}

fn injected(what: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {what} failure"))
}

fn sorted_by_date(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| (e.date, e.start_time));
    events
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every user back-reference write fail until reset.
    pub fn fail_user_links(&self, fail: bool) {
        self.faults.user_links.store(fail, Ordering::SeqCst);
    }

    /// Make notification inserts fail until reset.
    pub fn fail_notifications(&self, fail: bool) {
        self.faults.notifications.store(fail, Ordering::SeqCst);
    }

    /// Run `write` against the stored event and users at the start of the
    /// next `delete_event`, before its version check. Simulates a booking
    /// or RSVP committing while a delete is in flight.
    pub async fn before_next_event_delete<F>(&self, write: F)
    where
        F: FnOnce(&mut Event, &mut HashMap<DbId, User>) + Send + Sync + 'static,
    {
        self.docs.write().await.before_delete = BeforeDelete(Some(Box::new(write)));
    }

    /// Snapshot of every stored notification, oldest first.
    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.docs.read().await.notifications.clone()
    }

    /// Snapshot of every stored event.
    pub async fn all_events(&self) -> Vec<Event> {
        sorted_by_date(self.docs.read().await.events.values().cloned().collect())
    }

    fn check_user_links(&self) -> StoreResult<()> {
        if self.faults.user_links.load(Ordering::SeqCst) {
            return Err(injected("user link"));
        }
        Ok(())
    }

    async fn with_user<F>(&self, user_id: DbId, f: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut User) -> bool + Send,
    {
        self.check_user_links()?;
        let mut docs = self.docs.write().await;
        Ok(docs.users.get_mut(&user_id).map(f).unwrap_or(false))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.docs.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut docs = self.docs.write().await;
        if docs.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Unavailable(format!(
                "duplicate email {}",
                user.email
            )));
        }
        docs.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_slot_alert_recipients(&self) -> StoreResult<Vec<User>> {
        let docs = self.docs.read().await;
        let mut users: Vec<User> = docs
            .users
            .values()
            .filter(|u| u.wants_slot_alerts())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_notification_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        Ok(match docs.users.get_mut(&user_id) {
            Some(user) => {
                user.notification_preferences = prefs.clone();
                true
            }
            None => false,
        })
    }

    async fn update_user_profile(&self, user: &User) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        Ok(match docs.users.get_mut(&user.id) {
            Some(stored) => {
                stored.name.clone_from(&user.name);
                stored.bio.clone_from(&user.bio);
                stored.profile_picture.clone_from(&user.profile_picture);
                true
            }
            None => false,
        })
    }

    async fn add_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            if !u.events_attending.contains(&event_id) {
                u.events_attending.push(event_id);
            }
            true
        })
        .await
    }

    async fn remove_event_attending(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            let before = u.events_attending.len();
            u.events_attending.retain(|id| *id != event_id);
            before != u.events_attending.len()
        })
        .await
    }

    async fn add_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            if !u.performance_slots.contains(&entry) {
                u.performance_slots.push(entry);
            }
            true
        })
        .await
    }

    async fn remove_performance_slot(
        &self,
        user_id: DbId,
        entry: PerformanceSlotRef,
    ) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            let before = u.performance_slots.len();
            u.performance_slots.retain(|p| *p != entry);
            before != u.performance_slots.len()
        })
        .await
    }

    async fn add_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            if !u.events_hosting.contains(&event_id) {
                u.events_hosting.push(event_id);
            }
            true
        })
        .await
    }

    async fn remove_event_hosting(&self, user_id: DbId, event_id: DbId) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            let before = u.events_hosting.len();
            u.events_hosting.retain(|id| *id != event_id);
            before != u.events_hosting.len()
        })
        .await
    }

    async fn unlink_event(
        &self,
        event_id: DbId,
        attendee_ids: &[DbId],
        claimant_ids: &[DbId],
    ) -> StoreResult<u64> {
        self.check_user_links()?;
        let mut docs = self.docs.write().await;
        let mut touched = 0;
        for user in docs.users.values_mut() {
            let mut hit = false;
            if attendee_ids.contains(&user.id) {
                user.events_attending.retain(|id| *id != event_id);
                hit = true;
            }
            if claimant_ids.contains(&user.id) {
                user.performance_slots.retain(|p| p.event_id != event_id);
                hit = true;
            }
            if hit {
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn replace_user_links(
        &self,
        user_id: DbId,
        events_attending: &[DbId],
        performance_slots: &[PerformanceSlotRef],
    ) -> StoreResult<bool> {
        self.with_user(user_id, |u| {
            u.events_attending = events_attending.to_vec();
            u.performance_slots = performance_slots.to_vec();
            true
        })
        .await
    }

    async fn find_event(&self, id: DbId) -> StoreResult<Option<Event>> {
        Ok(self.docs.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self, status: Option<EventStatus>) -> StoreResult<Vec<Event>> {
        let docs = self.docs.read().await;
        let events = docs
            .events
            .values()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        Ok(sorted_by_date(events))
    }

    async fn find_events_involving(&self, user_id: DbId) -> StoreResult<Vec<Event>> {
        let docs = self.docs.read().await;
        let events = docs
            .events
            .values()
            .filter(|e| {
                e.attendance_for(user_id).is_some()
                    || e.time_slots.iter().any(|s| s.claimant == Some(user_id))
            })
            .cloned()
            .collect();
        Ok(sorted_by_date(events))
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.docs
            .write()
            .await
            .events
            .insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        match docs.events.get_mut(&event.id) {
            Some(stored) if stored.version == event.version => {
                let mut next = event.clone();
                next.version = event.version + 1;
                next.updated_at = chrono::Utc::now();
                *stored = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_event(&self, event: &Event) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        if let Some(write) = docs.before_delete.0.take() {
            let Documents { users, events, .. } = &mut *docs;
            if let Some(stored) = events.get_mut(&event.id) {
                write(stored, users);
            }
        }
        match docs.events.get(&event.id) {
            Some(stored) if stored.version == event.version => {
                docs.events.remove(&event.id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<u64> {
        if self.faults.notifications.load(Ordering::SeqCst) {
            return Err(injected("notification"));
        }
        let mut docs = self.docs.write().await;
        docs.notifications.extend_from_slice(notifications);
        Ok(notifications.len() as u64)
    }

    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let docs = self.docs.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(docs
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient_id && (!unread_only || !n.read))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_notification(&self, id: DbId) -> StoreResult<Option<Notification>> {
        let docs = self.docs.read().await;
        Ok(docs.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn count_unread_notifications(&self, recipient_id: DbId) -> StoreResult<i64> {
        let docs = self.docs.read().await;
        let count = docs
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count();
        Ok(count as i64)
    }

    async fn mark_notification_read(&self, id: DbId) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        Ok(match docs.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        })
    }

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        let mut marked = 0;
        for n in docs
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
        {
            n.read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete_notification(&self, id: DbId) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        let before = docs.notifications.len();
        docs.notifications.retain(|n| n.id != id);
        Ok(before != docs.notifications.len())
    }
}

/// HashMap-backed blob store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, (String, Vec<u8>)>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `delete` fail until reset.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, filename: &str) -> bool {
        self.blobs.read().await.contains_key(filename)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let filename = new_id().simple().to_string();
        self.blobs
            .write()
            .await
            .insert(filename.clone(), (content_type.to_string(), bytes));
        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected("blob delete"));
        }
        self.blobs.write().await.remove(filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::new_event;
    use crate::user::{NewUser, UserType};

    fn user(email: &str, user_type: UserType) -> User {
        User::new(NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: String::new(),
            user_type,
        })
    }

    #[tokio::test]
    async fn update_event_rejects_stale_version() {
        let store = MemoryStore::new();
        let event = Event::new(new_event(1)).unwrap();
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

    #[tokio::test]
    async fn delete_event_rejects_stale_version() {
        let store = MemoryStore::new();
        let event = Event::new(new_event(1)).unwrap();
        store.insert_event(&event).await.unwrap();
        assert!(store.update_event(&event).await.unwrap());

        assert!(!store.delete_event(&event).await.unwrap());
        let current = store.find_event(event.id).await.unwrap().unwrap();
        assert!(store.delete_event(&current).await.unwrap());
        assert!(store.find_event(event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn attending_list_has_set_semantics() {
        let store = MemoryStore::new();
        let u = user("a@example.com", UserType::Guest);
        store.insert_user(&u).await.unwrap();
        let event_id = new_id();

        store.add_event_attending(u.id, event_id).await.unwrap();
        store.add_event_attending(u.id, event_id).await.unwrap();

        let stored = store.find_user(u.id).await.unwrap().unwrap();
        assert_eq!(stored.events_attending, vec![event_id]);
    }

    #[tokio::test]
    async fn unlink_only_touches_listed_users() {
        let store = MemoryStore::new();
        let guest = user("g@example.com", UserType::Guest);
        let comic = user("c@example.com", UserType::Comedian);
        let bystander = user("b@example.com", UserType::Guest);
        for u in [&guest, &comic, &bystander] {
            store.insert_user(u).await.unwrap();
        }
        let event_id = new_id();
        let other_event = new_id();
        store.add_event_attending(guest.id, event_id).await.unwrap();
        store.add_event_attending(bystander.id, event_id).await.unwrap();
        let entry = PerformanceSlotRef {
            event_id,
            slot_id: new_id(),
        };
        let keep = PerformanceSlotRef {
            event_id: other_event,
            slot_id: new_id(),
        };
        store.add_performance_slot(comic.id, entry).await.unwrap();
        store.add_performance_slot(comic.id, keep).await.unwrap();

        let touched = store
            .unlink_event(event_id, &[guest.id], &[comic.id])
            .await
            .unwrap();

        assert_eq!(touched, 2);
        let guest = store.find_user(guest.id).await.unwrap().unwrap();
        let comic = store.find_user(comic.id).await.unwrap().unwrap();
        let bystander = store.find_user(bystander.id).await.unwrap().unwrap();
        assert!(guest.events_attending.is_empty());
        assert_eq!(comic.performance_slots, vec![keep]);
        assert_eq!(bystander.events_attending, vec![event_id]);
    }

    #[tokio::test]
    async fn injected_faults_fail_writes() {
        let store = MemoryStore::new();
        let u = user("f@example.com", UserType::Guest);
        store.insert_user(&u).await.unwrap();

        store.fail_user_links(true);
        assert!(store.add_event_attending(u.id, new_id()).await.is_err());
        store.fail_user_links(false);
        assert!(store.add_event_attending(u.id, new_id()).await.is_ok());

        store.fail_notifications(true);
        assert!(store.insert_notifications(&[]).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_user(&user("dup@example.com", UserType::Guest))
            .await
            .unwrap();
        assert!(store
            .insert_user(&user("dup@example.com", UserType::Host))
            .await
            .is_err());
    }
}
