//! Weather aggregation gateway
//!
//! Given a place name, queries a weather provider's current, forecast,
//! astronomy and alerts endpoints concurrently and merges the answers into a
//! single payload, translating provider failures into client-facing errors.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod normalize;
pub mod query;
pub mod telemetry;
pub mod upstream;
pub mod web;

// Re-export core types for public API
pub use config::{GatewayConfig, LoggingConfig, ProviderConfig, ServerConfig};
pub use error::{ConfigError, ErrorBody, GatewayError};
pub use gateway::WeatherGateway;
pub use models::{AggregatedWeather, Alert, ResolvedLocation};
pub use query::{WeatherParams, WeatherQuery};
pub use upstream::{Endpoint, UpstreamError, UpstreamResults, WeatherApiClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
