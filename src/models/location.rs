//! Location model for a place the provider managed to geocode

use serde::{Deserialize, Serialize};

/// A location with usable coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Location name (city, town, etc.)
    pub name: String,
    /// Region or state
    pub region: String,
    /// Country name
    pub country: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// IANA timezone id, e.g. `Europe/London`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz_id: Option<String>,
    /// Local time at the location as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localtime: Option<String>,
}

impl ResolvedLocation {
    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}
