//! Aggregated weather payload returned to clients

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ResolvedLocation;

/// Everything the gateway knows about a location, merged from four provider calls
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AggregatedWeather {
    /// Location resolved from the current-conditions call
    pub location: ResolvedLocation,
    /// Current conditions, passed through from the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
    /// Multi-day forecast, absent when the forecast call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Value>,
    /// Sun and moon times, absent when the astronomy call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astronomy: Option<Value>,
    /// Active alerts in provider order; empty rather than absent
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// A single weather alert
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msgtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Provider fields not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Alert {
    /// Headline if present, else the event name
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.headline
            .as_deref()
            .filter(|h| !h.is_empty())
            .or(self.event.as_deref())
    }
}
