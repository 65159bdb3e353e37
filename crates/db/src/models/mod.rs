//! Row models.
//!
//! Each `*Row` mirrors one table and converts into the matching domain type
//! from `openmic-core`. Enum columns are stored as text and parsed on the
//! way out; a value the domain does not know is a decode error.

pub mod event;
pub mod notification;
pub mod user;

/// Wrap a domain parse failure as a sqlx decode error.
pub(crate) fn decode_error(err: openmic_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
