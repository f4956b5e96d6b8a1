//! Error types and client-facing translation for the weather gateway
//!
//! Every failure a request can hit ends up as a [`GatewayError`], which knows
//! its HTTP status and the message the client is allowed to see.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

pub const LOCATION_REQUIRED_MESSAGE: &str = "Location is required";
pub const LOCATION_NOT_FOUND_MESSAGE: &str =
    "Location not found. Try a bigger city or check spelling.";
pub const PROVIDER_FALLBACK_MESSAGE: &str = "Could not fetch weather data from provider";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected server error while fetching weather data";
pub const MISCONFIGURED_MESSAGE: &str = "Server misconfigured: WEATHER_API_KEY is not set";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

/// Main error type for a weather request
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The `location` query parameter was missing or blank
    #[error("Invalid input: location is required")]
    InvalidInput,

    /// The provider answered but could not geocode the location
    #[error("Location could not be resolved to coordinates")]
    LocationNotFound,

    /// The provider returned an error status
    #[error("Upstream returned HTTP {status}: {}", message.as_deref().unwrap_or("<no message>"))]
    UpstreamTransport {
        status: u16,
        message: Option<String>,
    },

    /// The provider could not be reached at all
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// No provider API key was configured at startup
    #[error("Server misconfigured: missing provider API key")]
    ServerMisconfigured,

    /// Anything else, e.g. an unparseable provider body
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Invalid startup configuration
#[derive(Error, Debug)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// JSON body sent for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl GatewayError {
    /// Create a new upstream transport error
    pub fn upstream<S: Into<String>>(status: u16, message: Option<S>) -> Self {
        Self::UpstreamTransport {
            status,
            message: message.map(Into::into),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status sent to the client
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput => StatusCode::BAD_REQUEST,
            GatewayError::LocationNotFound => StatusCode::NOT_FOUND,
            GatewayError::UpstreamTransport { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GatewayError::UpstreamUnavailable { .. }
            | GatewayError::ServerMisconfigured
            | GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message the client is allowed to see
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::InvalidInput => LOCATION_REQUIRED_MESSAGE.to_string(),
            GatewayError::LocationNotFound => LOCATION_NOT_FOUND_MESSAGE.to_string(),
            GatewayError::UpstreamTransport { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(PROVIDER_FALLBACK_MESSAGE)
                .to_string(),
            GatewayError::UpstreamUnavailable { .. } | GatewayError::Internal { .. } => {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
            GatewayError::ServerMisconfigured => MISCONFIGURED_MESSAGE.to_string(),
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status {
                status, message, ..
            } => GatewayError::UpstreamTransport { status, message },
            UpstreamError::Timeout { .. } | UpstreamError::Network { .. } => {
                GatewayError::UpstreamUnavailable {
                    message: err.to_string(),
                }
            }
            UpstreamError::Decode { .. } | UpstreamError::Cancelled { .. } => {
                GatewayError::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Weather request failed: {self}");
        } else {
            tracing::warn!(status = status.as_u16(), "Weather request rejected: {self}");
        }
        (status, Json(ErrorBody::new(self.user_message()))).into_response()
    }
}
