//! Wire shapes of the upstream weather provider
//!
//! Every field is optional: the provider omits sections freely, and a missing
//! field must degrade to a defined default instead of failing the parse.

use serde::Deserialize;
use serde_json::Value;

use super::ResolvedLocation;

/// Location block shared by all provider responses
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ProviderLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tz_id: Option<String>,
    #[serde(default)]
    pub localtime: Option<String>,
}

impl ProviderLocation {
    /// Turn the provider location into a resolved one.
    ///
    /// Returns `None` unless both coordinates are present.
    #[must_use]
    pub fn resolve(self) -> Option<ResolvedLocation> {
        let (lat, lon) = (self.lat?, self.lon?);
        Some(ResolvedLocation {
            name: self.name.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            lat,
            lon,
            tz_id: self.tz_id,
            localtime: self.localtime,
        })
    }
}

/// Response of `current.json`
#[derive(Debug, Default, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub location: Option<ProviderLocation>,
    #[serde(default)]
    pub current: Option<Value>,
}

/// Response of `forecast.json`
#[derive(Debug, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub forecast: Option<Value>,
}

/// Response of `astronomy.json`
#[derive(Debug, Default, Deserialize)]
pub struct AstronomyResponse {
    #[serde(default)]
    pub astronomy: Option<Value>,
}

/// Response of `alerts.json`
///
/// Kept as raw JSON: a malformed alerts block must not fail the request.
#[derive(Debug, Default, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub alerts: Option<Value>,
}

/// Error body the provider sends alongside a non-2xx status
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorDetail {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProviderErrorBody {
    /// Extract the provider's error message from a raw body, if there is one
    #[must_use]
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ProviderErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
    }
}
