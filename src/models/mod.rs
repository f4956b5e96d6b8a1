//! Data models for the weather gateway
//!
//! This module contains the request-scoped models organized by concern:
//! - Location: the location resolved from the current-conditions call
//! - Weather: the aggregated payload returned to clients
//! - Provider: wire shapes of the upstream provider's responses

pub mod location;
pub mod provider;
pub mod weather;

// Re-export all public types for convenient access
pub use location::ResolvedLocation;
pub use provider::{
    AlertsResponse, AstronomyResponse, CurrentResponse, ForecastResponse, ProviderErrorBody,
    ProviderLocation,
};
pub use weather::{AggregatedWeather, Alert};
