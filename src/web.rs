use std::any::Any;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::error::{ErrorBody, INTERNAL_ERROR_MESSAGE};
use crate::gateway::WeatherGateway;

/// Build the full application router
pub fn app(config: &ServerConfig, gateway: WeatherGateway) -> Router {
    Router::new()
        .route("/", get(api::health))
        .nest("/api", api::router())
        .fallback(api::route_not_found)
        .with_state(gateway)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.frontend_origin))
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

pub async fn run(config: &ServerConfig, gateway: WeatherGateway) -> Result<()> {
    let app = app(config, gateway);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    Ok(())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(CorsAny);

    if origin == "*" {
        return cors.allow_origin(CorsAny);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid frontend origin '{origin}', cross-origin requests will be refused");
            cors
        }
    }
}

/// Last line of defence: a panicking handler becomes a 500 instead of a dropped connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Unhandled error: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
