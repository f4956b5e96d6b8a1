//! Merging of the four provider responses into one payload
//!
//! Location resolution depends on the current-conditions call alone. Forecast,
//! astronomy and alerts are enrichments: when they fail, the payload degrades
//! instead of the request failing.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::models::{AggregatedWeather, Alert, AlertsResponse, ProviderLocation};
use crate::upstream::{UpstreamResult, UpstreamResults};

/// Build the client payload from settled upstream results
pub fn normalize(results: UpstreamResults) -> Result<AggregatedWeather, GatewayError> {
    let UpstreamResults {
        current,
        forecast,
        astronomy,
        alerts,
    } = results;

    let current = current?;

    let location = current
        .location
        .and_then(ProviderLocation::resolve)
        .ok_or(GatewayError::LocationNotFound)?;

    debug!(
        "Resolved location {} at ({})",
        location.name,
        location.format_coordinates()
    );

    Ok(AggregatedWeather {
        location,
        current: current.current,
        forecast: section(forecast, |r| r.forecast),
        astronomy: section(astronomy, |r| r.astronomy),
        alerts: alerts_from(alerts),
    })
}

fn section<T>(result: UpstreamResult<T>, extract: impl FnOnce(T) -> Option<Value>) -> Option<Value> {
    match result {
        Ok(response) => extract(response),
        Err(e) => {
            warn!(endpoint = %e.endpoint(), "Omitting section from response: {e}");
            None
        }
    }
}

fn alerts_from(result: UpstreamResult<AlertsResponse>) -> Vec<Alert> {
    match result {
        Ok(response) => extract_alerts(response.alerts),
        Err(e) => {
            warn!(endpoint = %e.endpoint(), "Returning no alerts: {e}");
            Vec::new()
        }
    }
}

/// Pull the alert list out of the provider's `alerts` block.
///
/// Anything other than `{"alert": [...]}` yields an empty list; entries that
/// are not alert objects are skipped.
#[must_use]
pub fn extract_alerts(alerts: Option<Value>) -> Vec<Alert> {
    let Some(Value::Array(items)) = alerts.and_then(|mut a| a.get_mut("alert").map(Value::take))
    else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Alert>(item) {
            Ok(alert) => Some(alert),
            Err(e) => {
                debug!("Skipping malformed alert: {e}");
                None
            }
        })
        .collect()
}
