//! User entity: one type for guests, comedians and hosts.
//!
//! Role-specific data (performance slots for comedians, hosted events for
//! hosts) lives on the same struct; the operations that need a role check it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{new_id, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The kind of account. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Guest,
    Comedian,
    Host,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Comedian => "comedian",
            Self::Host => "host",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "comedian" => Ok(Self::Comedian),
            "host" => Ok(Self::Host),
            other => Err(CoreError::Validation(format!(
                "Invalid user type '{other}'. Must be one of: guest, comedian, host"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Notification preferences
// ---------------------------------------------------------------------------

/// How long before a performance the reminder should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReminderTime {
    #[serde(rename = "1hour")]
    OneHour,
    #[default]
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
}

impl ReminderTime {
    /// Lead time before the performance start.
    pub fn lead_time(self) -> chrono::Duration {
        match self {
            Self::OneHour => chrono::Duration::hours(1),
            Self::OneDay => chrono::Duration::days(1),
            Self::OneWeek => chrono::Duration::weeks(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub enable_notifications: bool,
    pub available_slot_alerts: bool,
    pub upcoming_performance_reminders: bool,
    pub reminder_time: ReminderTime,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enable_notifications: true,
            available_slot_alerts: true,
            upcoming_performance_reminders: true,
            reminder_time: ReminderTime::default(),
        }
    }
}

/// Partial update for [`NotificationPreferences`]. Only `Some` fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub enable_notifications: Option<bool>,
    pub available_slot_alerts: Option<bool>,
    pub upcoming_performance_reminders: Option<bool>,
    pub reminder_time: Option<ReminderTime>,
}

impl NotificationPreferences {
    /// Apply a patch in place.
    pub fn apply(&mut self, patch: &PreferencesPatch) {
        if let Some(v) = patch.enable_notifications {
            self.enable_notifications = v;
        }
        if let Some(v) = patch.available_slot_alerts {
            self.available_slot_alerts = v;
        }
        if let Some(v) = patch.upcoming_performance_reminders {
            self.upcoming_performance_reminders = v;
        }
        if let Some(v) = patch.reminder_time {
            self.reminder_time = v;
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Back-reference from a comedian to a slot they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerformanceSlotRef {
    pub event_id: DbId,
    pub slot_id: DbId,
}

/// Full user document.
///
/// Contains the password hash -- it is skipped during serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub user_type: UserType,
    pub bio: String,
    pub profile_picture: String,
    pub events_attending: Vec<DbId>,
    pub performance_slots: Vec<PerformanceSlotRef>,
    pub events_hosting: Vec<DbId>,
    pub notification_preferences: NotificationPreferences,
    pub created_at: Timestamp,
}

/// Input for registering a user. Hashing happens before this point.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
}

impl User {
    /// Build a fresh user document with empty link lists and default preferences.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: new_id(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash: input.password_hash,
            user_type: input.user_type,
            bio: String::new(),
            profile_picture: String::new(),
            events_attending: Vec::new(),
            performance_slots: Vec::new(),
            events_hosting: Vec::new(),
            notification_preferences: NotificationPreferences::default(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Fail with [`CoreError::InvalidRole`] unless the user has the given type.
    pub fn require_type(&self, expected: UserType, action: &str) -> Result<(), CoreError> {
        if self.user_type == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidRole(format!(
                "Only {expected} accounts can {action}"
            )))
        }
    }

    /// Whether this user should receive `slot_available` fan-out.
    pub fn wants_slot_alerts(&self) -> bool {
        self.user_type == UserType::Comedian
            && self.notification_preferences.enable_notifications
            && self.notification_preferences.available_slot_alerts
    }

    /// Whether this user accepts any notifications at all.
    pub fn accepts_notifications(&self) -> bool {
        self.notification_preferences.enable_notifications
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Partial update for the public profile fields. Only `Some` fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 500))]
    pub profile_picture: Option<String>,
}

impl ProfilePatch {
    /// Validate, then apply in place. Names are trimmed.
    pub fn apply(&self, user: &mut User) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(CoreError::Validation("name must not be empty".into()));
            }
            user.name = name.to_string();
        }
        if let Some(bio) = &self.bio {
            user.bio.clone_from(bio);
        }
        if let Some(picture) = &self.profile_picture {
            user.profile_picture = picture.trim().to_string();
        }
        Ok(())
    }
}
