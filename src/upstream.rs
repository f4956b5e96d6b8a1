//! HTTP client for the upstream weather provider
//!
//! One lookup fans out into four independent calls (current, forecast,
//! astronomy, alerts) against the same location. The calls run concurrently
//! and are joined before anything is normalized. Each call has its own
//! deadline, and a failure of the current-conditions call cancels the others
//! because no location can be resolved without it.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::models::{
    AlertsResponse, AstronomyResponse, CurrentResponse, ForecastResponse, ProviderErrorBody,
};
use crate::query::WeatherQuery;

/// Responses slower than this get a warning
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Provider capabilities queried for every lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
    Astronomy,
    Alerts,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
            Endpoint::Astronomy => "astronomy",
            Endpoint::Alerts => "alerts",
        }
    }

    /// Path of the endpoint relative to the provider base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "current.json",
            Endpoint::Forecast => "forecast.json",
            Endpoint::Astronomy => "astronomy.json",
            Endpoint::Alerts => "alerts.json",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Current,
            Endpoint::Forecast,
            Endpoint::Astronomy,
            Endpoint::Alerts,
        ]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single upstream call
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The provider answered with a non-2xx status
    #[error("{endpoint} request failed with HTTP {status}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: Option<String>,
    },

    #[error("{endpoint} request timed out")]
    Timeout { endpoint: Endpoint },

    #[error("{endpoint} request failed: {message}")]
    Network { endpoint: Endpoint, message: String },

    #[error("invalid {endpoint} response: {message}")]
    Decode { endpoint: Endpoint, message: String },

    /// Abandoned because the current-conditions call already failed
    #[error("{endpoint} request cancelled")]
    Cancelled { endpoint: Endpoint },
}

impl UpstreamError {
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        match self {
            UpstreamError::Status { endpoint, .. }
            | UpstreamError::Timeout { endpoint }
            | UpstreamError::Network { endpoint, .. }
            | UpstreamError::Decode { endpoint, .. }
            | UpstreamError::Cancelled { endpoint } => *endpoint,
        }
    }

    fn from_reqwest(endpoint: Endpoint, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return UpstreamError::Timeout { endpoint };
        }
        // the request URL carries the API key
        UpstreamError::Network {
            endpoint,
            message: err.without_url().to_string(),
        }
    }
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Settled outcome of the four calls issued for one lookup
#[derive(Debug)]
pub struct UpstreamResults {
    pub current: UpstreamResult<CurrentResponse>,
    pub forecast: UpstreamResult<ForecastResponse>,
    pub astronomy: UpstreamResult<AstronomyResponse>,
    pub alerts: UpstreamResult<AlertsResponse>,
}

/// Weather provider client
#[derive(Debug)]
pub struct WeatherApiClient {
    /// HTTP client, pooled across requests
    client: Client,
    /// Provider base URL without trailing slash
    base_url: String,
    api_key: String,
    /// Deadline for each individual call
    timeout: Duration,
}

impl WeatherApiClient {
    /// Create a new provider client
    pub fn new(api_key: String, config: &ProviderConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("weather-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    /// Issue all four provider calls for a query and wait for them to settle.
    ///
    /// Never short-circuits on a forecast, astronomy or alerts failure. A
    /// current-conditions failure cancels whatever is still in flight.
    #[instrument(skip_all, fields(location = query.location(), days = query.forecast_days()))]
    pub async fn fetch_all(&self, query: &WeatherQuery) -> UpstreamResults {
        let token = CancellationToken::new();
        let days = query.forecast_days().to_string();
        let forecast_extra = [("days", days.as_str())];
        let start = Instant::now();

        let current = async {
            let result = self
                .fetch::<CurrentResponse>(Endpoint::Current, query, &[("aqi", "yes")])
                .await;
            if result.is_err() {
                token.cancel();
            }
            result
        };
        let forecast = self.fetch_unless_cancelled::<ForecastResponse>(
            Endpoint::Forecast,
            query,
            &forecast_extra,
            &token,
        );
        let astronomy =
            self.fetch_unless_cancelled::<AstronomyResponse>(Endpoint::Astronomy, query, &[], &token);
        let alerts =
            self.fetch_unless_cancelled::<AlertsResponse>(Endpoint::Alerts, query, &[], &token);

        let (current, forecast, astronomy, alerts) =
            tokio::join!(current, forecast, astronomy, alerts);

        debug!(
            "All upstream calls settled in {:.3}s",
            start.elapsed().as_secs_f64()
        );

        UpstreamResults {
            current,
            forecast,
            astronomy,
            alerts,
        }
    }

    async fn fetch_unless_cancelled<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &WeatherQuery,
        extra: &[(&str, &str)],
        token: &CancellationToken,
    ) -> UpstreamResult<T> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("Cancelling {endpoint} request, current conditions failed");
                Err(UpstreamError::Cancelled { endpoint })
            }
            result = self.fetch(endpoint, query, extra) => result,
        }
    }

    /// Make one provider call: a single attempt under the per-call deadline
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &WeatherQuery,
        extra: &[(&str, &str)],
    ) -> UpstreamResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let start_time = Instant::now();

        let exchange = async {
            let response = self
                .client
                .get(&url)
                .query(&[("key", self.api_key.as_str()), ("q", query.location())])
                .query(extra)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                warn!(
                    "No response within {:.1}s, giving up",
                    self.timeout.as_secs_f64()
                );
                UpstreamError::Timeout { endpoint }
            })?
            .map_err(|e| UpstreamError::from_reqwest(endpoint, e))?;

        let total_duration = start_time.elapsed();
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow provider response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        if !status.is_success() {
            let message = ProviderErrorBody::message_from(&body);
            warn!(
                status = status.as_u16(),
                "Provider returned an error: {}",
                message.as_deref().unwrap_or("<no message>")
            );
            return Err(UpstreamError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        info!(
            "Provider responded {} in {:.3}s",
            status.as_u16(),
            total_duration.as_secs_f64()
        );

        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        let paths: Vec<&str> = Endpoint::all().iter().map(Endpoint::path).collect();
        assert_eq!(
            paths,
            vec!["current.json", "forecast.json", "astronomy.json", "alerts.json"]
        );
    }

    #[test]
    fn test_error_reports_endpoint() {
        let err = UpstreamError::Status {
            endpoint: Endpoint::Astronomy,
            status: 400,
            message: None,
        };
        assert_eq!(err.endpoint(), Endpoint::Astronomy);
        assert_eq!(err.to_string(), "astronomy request failed with HTTP 400");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ProviderConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..ProviderConfig::default()
        };
        let client = WeatherApiClient::new("key".to_string(), &config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1");
        assert_eq!(client.timeout, Duration::from_secs(10));
    }
}
