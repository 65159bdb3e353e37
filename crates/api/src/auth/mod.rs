//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation (and generation for callers
//!   that sit in front of this service, such as tests).

pub mod jwt;
