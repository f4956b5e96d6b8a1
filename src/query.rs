//! Request validation for weather lookups
//!
//! Turns the raw `location`/`days` query parameters into a [`WeatherQuery`].
//! A missing location is the only rejection; an out-of-range or unparseable
//! day count is clamped instead.

use crate::error::GatewayError;

pub const MIN_FORECAST_DAYS: u8 = 1;
/// Longest forecast the provider's free tier serves
pub const MAX_FORECAST_DAYS: u8 = 3;
pub const DEFAULT_FORECAST_DAYS: u8 = 3;

/// Raw query parameters as they arrive on the wire
#[derive(Debug, Default, Clone)]
pub struct WeatherParams {
    pub location: Option<String>,
    pub days: Option<String>,
}

impl WeatherParams {
    pub fn new<S: Into<String>>(location: S) -> Self {
        Self {
            location: Some(location.into()),
            days: None,
        }
    }

    #[must_use]
    pub fn with_days<S: Into<String>>(mut self, days: S) -> Self {
        self.days = Some(days.into());
        self
    }

    /// Collect parameters from decoded query pairs. A repeated key keeps its
    /// first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "location" => &mut params.location,
                "days" => &mut params.days,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// A validated weather lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    location: String,
    forecast_days: u8,
}

impl WeatherQuery {
    /// Validate a location and clamp the requested forecast length
    pub fn new(location: &str, days: Option<&str>) -> Result<Self, GatewayError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(GatewayError::InvalidInput);
        }

        Ok(Self {
            location: location.to_string(),
            forecast_days: clamp_forecast_days(days),
        })
    }

    /// Validate raw query parameters
    pub fn from_params(params: &WeatherParams) -> Result<Self, GatewayError> {
        let location = params.location.as_deref().ok_or(GatewayError::InvalidInput)?;
        Self::new(location, params.days.as_deref())
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn forecast_days(&self) -> u8 {
        self.forecast_days
    }
}

/// Parse a day count, defaulting when it is missing or not a number and
/// clamping it into the supported range otherwise.
#[must_use]
pub fn clamp_forecast_days(raw: Option<&str>) -> u8 {
    let parsed = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite());

    match parsed {
        Some(days) => {
            let clamped = days.clamp(f64::from(MIN_FORECAST_DAYS), f64::from(MAX_FORECAST_DAYS));
            // in range [1, 3] after clamping, so the cast cannot truncate
            clamped.trunc() as u8
        }
        None => DEFAULT_FORECAST_DAYS,
    }
}
