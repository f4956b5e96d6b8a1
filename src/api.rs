//! HTTP handlers for the gateway

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{ErrorBody, GatewayError, ROUTE_NOT_FOUND_MESSAGE};
use crate::gateway::WeatherGateway;
use crate::models::AggregatedWeather;
use crate::query::WeatherParams;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Routes mounted under `/api`
pub fn router() -> Router<WeatherGateway> {
    Router::new().route("/weather", get(get_weather))
}

async fn get_weather(
    State(gateway): State<WeatherGateway>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<AggregatedWeather>, GatewayError> {
    // decoded as pairs so a repeated key cannot fail the whole query
    let Query(pairs) = pairs.map_err(|e| {
        tracing::debug!("Unreadable query string: {e}");
        GatewayError::InvalidInput
    })?;
    let params = WeatherParams::from_pairs(pairs);

    let weather = gateway.get_weather(&params).await?;
    Ok(Json(weather))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Backend running ✅".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(ROUTE_NOT_FOUND_MESSAGE)),
    )
}
