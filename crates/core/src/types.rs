/// All primary keys are UUIDv7, generated by the application so embedded
/// sub-entities (time slots, attendance entries) have ids before the first write.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered identifier.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
