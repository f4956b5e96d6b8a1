//! Integration tests for the weather gateway HTTP surface
//!
//! The router is driven in-process; the weather provider is a wiremock server.

use std::time::{Duration, Instant};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;
use weather_gateway::{ProviderConfig, ServerConfig, WeatherGateway, error, web};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn provider_config(server: &MockServer, timeout_seconds: u32) -> ProviderConfig {
    ProviderConfig {
        api_key: Some(API_KEY.to_string()),
        base_url: format!("{}/v1", server.uri()),
        timeout_seconds,
    }
}

fn app_for(server: &MockServer) -> Router {
    let gateway = WeatherGateway::from_config(&provider_config(server, 5)).unwrap();
    web::app(&ServerConfig::default(), gateway)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn location_block() -> Value {
    json!({
        "name": "London",
        "region": "City of London, Greater London",
        "country": "United Kingdom",
        "lat": 51.52,
        "lon": -0.11,
        "tz_id": "Europe/London",
        "localtime_epoch": 1_792_400_000,
        "localtime": "2026-10-19 12:00"
    })
}

fn current_body() -> Value {
    json!({
        "location": location_block(),
        "current": {
            "temp_c": 14.0,
            "condition": { "text": "Partly cloudy", "code": 1003 },
            "air_quality": { "pm2_5": 6.1 }
        }
    })
}

fn forecast_body() -> Value {
    json!({
        "location": location_block(),
        "forecast": {
            "forecastday": [
                { "date": "2026-10-19", "day": { "maxtemp_c": 16.2 } },
                { "date": "2026-10-20", "day": { "maxtemp_c": 15.1 } }
            ]
        }
    })
}

fn astronomy_body() -> Value {
    json!({
        "location": location_block(),
        "astronomy": {
            "astro": {
                "sunrise": "07:25 AM",
                "sunset": "06:01 PM",
                "moonrise": "09:14 PM",
                "moonset": "01:33 PM"
            }
        }
    })
}

fn alerts_body() -> Value {
    json!({
        "location": location_block(),
        "alerts": {
            "alert": [
                {
                    "headline": "Yellow wind warning",
                    "msgtype": "Alert",
                    "severity": "Moderate",
                    "event": "Wind",
                    "language": "en-GB"
                },
                {
                    "headline": "Flood alert",
                    "msgtype": "Alert",
                    "severity": "Minor",
                    "event": "Flood"
                }
            ]
        }
    })
}

async fn mount(server: &MockServer, endpoint: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{endpoint}")))
        .and(query_param("key", API_KEY))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_current(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", API_KEY))
        .and(query_param("q", "London"))
        .and(query_param("aqi", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;
}

async fn mount_all(server: &MockServer) {
    mount_current(server).await;
    mount(server, "forecast.json", ResponseTemplate::new(200).set_body_json(forecast_body())).await;
    mount(server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(server, "alerts.json", ResponseTemplate::new(200).set_body_json(alerts_body())).await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn test_aggregates_all_four_sections() {
    let server = MockServer::start().await;
    mount_all(&server).await;

    let (status, body) = get(app_for(&server), "/api/weather?location=London&days=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["location"],
        json!({
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "tz_id": "Europe/London",
            "localtime": "2026-10-19 12:00"
        })
    );
    assert_eq!(body["current"]["condition"]["text"], "Partly cloudy");
    assert_eq!(body["forecast"]["forecastday"].as_array().unwrap().len(), 2);
    assert_eq!(body["astronomy"]["astro"]["sunset"], "06:01 PM");
    assert_eq!(body["alerts"][0]["headline"], "Yellow wind warning");
    assert_eq!(body["alerts"][0]["language"], "en-GB");
    assert_eq!(body["alerts"][1]["event"], "Flood");
    assert_eq!(request_count(&server).await, 4);
}

#[rstest]
#[case("/api/weather")]
#[case("/api/weather?location=")]
#[case("/api/weather?location=%20%20&days=2")]
#[tokio::test]
async fn test_missing_location_is_rejected_without_upstream_calls(#[case] uri: &str) {
    let server = MockServer::start().await;
    mount_all(&server).await;

    let (status, body) = get(app_for(&server), uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": error::LOCATION_REQUIRED_MESSAGE }));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_missing_credentials_fail_without_upstream_calls() {
    let app = web::app(&ServerConfig::default(), WeatherGateway::misconfigured());

    let (status, body) = get(app.clone(), "/api/weather?location=London").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": error::MISCONFIGURED_MESSAGE }));

    let (status, _) = get(app, "/api/weather?location=Paris&days=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_ungeocodable_location_is_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        "current.json",
        ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Qwertyville" },
            "current": { "temp_c": 10.0 }
        })),
    )
    .await;
    mount(&server, "forecast.json", ResponseTemplate::new(200).set_body_json(forecast_body())).await;
    mount(&server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(&server, "alerts.json", ResponseTemplate::new(200).set_body_json(alerts_body())).await;

    let (status, body) = get(app_for(&server), "/api/weather?location=Qwertyville").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": error::LOCATION_NOT_FOUND_MESSAGE }));
}

#[tokio::test]
async fn test_provider_status_and_message_pass_through() {
    let server = MockServer::start().await;
    mount(
        &server,
        "current.json",
        ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 2008, "message": "API key invalid" }
        })),
    )
    .await;
    mount(&server, "forecast.json", ResponseTemplate::new(200).set_body_json(forecast_body())).await;
    mount(&server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(&server, "alerts.json", ResponseTemplate::new(200).set_body_json(alerts_body())).await;

    let (status, body) = get(app_for(&server), "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "API key invalid" }));
}

#[tokio::test]
async fn test_provider_error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    mount(
        &server,
        "current.json",
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let (status, body) = get(app_for(&server), "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": error::PROVIDER_FALLBACK_MESSAGE }));
}

#[tokio::test]
async fn test_current_failure_cancels_slow_siblings() {
    let server = MockServer::start().await;
    mount(
        &server,
        "current.json",
        ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 1002, "message": "API key is invalid or not provided." }
        })),
    )
    .await;
    for endpoint in ["forecast.json", "astronomy.json", "alerts.json"] {
        mount(
            &server,
            endpoint,
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(4)),
        )
        .await;
    }

    let gateway = WeatherGateway::from_config(&provider_config(&server, 30)).unwrap();
    let app = web::app(&ServerConfig::default(), gateway);

    let start = Instant::now();
    let (status, body) = get(app, "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API key is invalid or not provided.");
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_enrichment_failures_degrade_silently() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount(&server, "forecast.json", ResponseTemplate::new(200).set_body_json(forecast_body())).await;
    mount(
        &server,
        "astronomy.json",
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })),
    )
    .await;
    mount(&server, "alerts.json", ResponseTemplate::new(500)).await;

    let (status, body) = get(app_for(&server), "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("forecast").is_some());
    assert!(body.get("astronomy").is_none());
    assert_eq!(body["alerts"], json!([]));
}

#[tokio::test]
async fn test_malformed_alerts_default_to_empty() {
    let server = MockServer::start().await;
    mount_current(&server).await;
    mount(&server, "forecast.json", ResponseTemplate::new(200).set_body_json(forecast_body())).await;
    mount(&server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(
        &server,
        "alerts.json",
        ResponseTemplate::new(200).set_body_json(json!({ "alerts": "not a list" })),
    )
    .await;

    let (status, body) = get(app_for(&server), "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alerts"], json!([]));
}

#[rstest]
#[case("0", "1")]
#[case("-5", "1")]
#[case("abc", "3")]
#[case("2", "2")]
#[case("999", "3")]
#[tokio::test]
async fn test_forecast_days_are_clamped_on_the_wire(#[case] days: &str, #[case] sent: &str) {
    let server = MockServer::start().await;
    mount_current(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("days", sent))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(&server, "alerts.json", ResponseTemplate::new(200).set_body_json(alerts_body())).await;

    let uri = format!("/api/weather?location=London&days={days}");
    let (status, body) = get(app_for(&server), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("forecast").is_some());
}

#[rstest]
#[case("/api/weather?location=London&days=2&days=3")]
#[case("/api/weather?days=2&location=London&location=Paris")]
#[tokio::test]
async fn test_repeated_keys_use_first_value(#[case] uri: &str) {
    let server = MockServer::start().await;
    mount_current(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("q", "London"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "astronomy.json", ResponseTemplate::new(200).set_body_json(astronomy_body())).await;
    mount(&server, "alerts.json", ResponseTemplate::new(200).set_body_json(alerts_body())).await;

    let (status, body) = get(app_for(&server), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["name"], "London");
    assert!(body.get("forecast").is_some());
}

#[tokio::test]
async fn test_repeated_days_reach_credential_check() {
    let app = web::app(&ServerConfig::default(), WeatherGateway::misconfigured());

    let (status, body) = get(app, "/api/weather?location=London&days=2&days=3").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": error::MISCONFIGURED_MESSAGE }));
}

#[tokio::test]
async fn test_unreachable_provider_is_generic_500() {
    // nothing listens on the discard port
    let config = ProviderConfig {
        api_key: Some(API_KEY.to_string()),
        base_url: "http://127.0.0.1:9/v1".to_string(),
        timeout_seconds: 2,
    };
    let app = web::app(
        &ServerConfig::default(),
        WeatherGateway::from_config(&config).unwrap(),
    );

    let (status, body) = get(app, "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": error::UNEXPECTED_ERROR_MESSAGE }));
}

#[tokio::test]
async fn test_hung_current_call_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        "current.json",
        ResponseTemplate::new(200)
            .set_body_json(current_body())
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let gateway = WeatherGateway::from_config(&provider_config(&server, 1)).unwrap();
    let app = web::app(&ServerConfig::default(), gateway);

    let (status, body) = get(app, "/api/weather?location=London").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": error::UNEXPECTED_ERROR_MESSAGE }));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let server = MockServer::start().await;
    mount_all(&server).await;
    let app = app_for(&server);

    let (_, first) = get(app.clone(), "/api/weather?location=London").await;
    let (_, second) = get(app, "/api/weather?location=London").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_check() {
    let app = web::app(&ServerConfig::default(), WeatherGateway::misconfigured());

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Backend running ✅");
    assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = web::app(&ServerConfig::default(), WeatherGateway::misconfigured());

    let (status, body) = get(app, "/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": error::ROUTE_NOT_FOUND_MESSAGE }));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = ServerConfig {
        frontend_origin: "https://weather.example.com".to_string(),
        ..ServerConfig::default()
    };
    let app = web::app(&config, WeatherGateway::misconfigured());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "https://weather.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://weather.example.com"
    );
}
