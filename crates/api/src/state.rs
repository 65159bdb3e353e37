use std::sync::Arc;

use openmic_booking::BookingServices;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the services only hold `Arc`s to the stores.
#[derive(Clone)]
pub struct AppState {
    /// Booking services wired to the entity and blob stores.
    pub services: BookingServices,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
