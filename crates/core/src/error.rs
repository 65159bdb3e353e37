use crate::store::StoreError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The user's type does not permit the operation (e.g. a guest booking a slot).
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The entity store itself failed. Fatal for the current request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Shorthand for a missing event.
    pub fn event_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Event",
            id,
        }
    }

    /// Shorthand for a missing user.
    pub fn user_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "User", id }
    }

    /// Shorthand for a missing time slot inside an event.
    pub fn slot_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "TimeSlot",
            id,
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
