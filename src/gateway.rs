//! Weather lookup orchestration
//!
//! Validation, the credential check, the upstream fan-out and normalization,
//! in that order. Everything is request-scoped; the only shared piece is the
//! provider client built once at startup.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, instrument};

use crate::config::ProviderConfig;
use crate::error::GatewayError;
use crate::models::AggregatedWeather;
use crate::normalize::normalize;
use crate::query::{WeatherParams, WeatherQuery};
use crate::upstream::WeatherApiClient;

/// Entry point for weather lookups
#[derive(Debug, Clone)]
pub struct WeatherGateway {
    /// `None` when no provider API key was configured
    client: Option<Arc<WeatherApiClient>>,
}

impl WeatherGateway {
    /// Build the gateway from provider configuration.
    ///
    /// A missing API key does not fail startup: the server still comes up and
    /// answers every lookup with a misconfiguration error.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config.api_key() {
            Some(api_key) => {
                info!("Using weather provider at {}", config.base_url);
                Ok(Self::new(WeatherApiClient::new(api_key.to_string(), config)?))
            }
            None => {
                error!("Missing WEATHER_API_KEY in environment; weather lookups will fail");
                Ok(Self::misconfigured())
            }
        }
    }

    #[must_use]
    pub fn new(client: WeatherApiClient) -> Self {
        Self {
            client: Some(Arc::new(client)),
        }
    }

    /// A gateway without provider credentials
    #[must_use]
    pub fn misconfigured() -> Self {
        Self { client: None }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Look up and aggregate the weather for raw query parameters
    #[instrument(skip_all, fields(location = params.location.as_deref().unwrap_or_default()))]
    pub async fn get_weather(
        &self,
        params: &WeatherParams,
    ) -> Result<AggregatedWeather, GatewayError> {
        let query = WeatherQuery::from_params(params)?;
        let client = self
            .client
            .as_ref()
            .ok_or(GatewayError::ServerMisconfigured)?;

        let results = client.fetch_all(&query).await;
        let weather = normalize(results)?;

        info!(
            "Aggregated weather for {} with {} alert(s)",
            weather.location.name,
            weather.alerts.len()
        );
        Ok(weather)
    }
}
