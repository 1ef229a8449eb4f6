//! Rallia notification dispatcher service.
//!
//! Receives newly inserted notification rows over HTTP and delivers them
//! through the notifications domain.

pub mod config;
pub mod db;
pub mod shutdown;

use axum::{Json, Router, extract::State, routing::get};
use core_config::AppInfo;
use domain_notifications::{ApiDoc, Dispatch, DispatcherConfig, NotificationDispatcher, handlers};
use eyre::WrapErr;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

use config::Config;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

async fn health(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: app.name,
        version: app.version,
    })
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full HTTP surface: the dispatch endpoint at `/`, `/health` and the
/// OpenAPI document.
pub fn app<D: Dispatch + 'static>(dispatcher: D, info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(info)
        .route("/api-docs/openapi.json", get(openapi))
        .merge(handlers::router(dispatcher))
        .layer(TraceLayer::new_for_http())
}

fn log_provider_status(config: &DispatcherConfig) {
    if config.resend.api_key.is_none() {
        warn!("RESEND_API_KEY not set; email deliveries will be recorded as failed");
    }
    if config.twilio.credentials().is_none() {
        warn!("Twilio credentials incomplete; SMS deliveries will be recorded as failed");
    }
    if config.expo.access_token.is_none() {
        info!("EXPO_ACCESS_TOKEN not set; sending push without enhanced security");
    }
}

pub async fn run(config: Config) -> eyre::Result<()> {
    info!(name = config.app.name, version = config.app.version, "Starting notification dispatcher");
    log_provider_status(&config.dispatcher);

    let db = db::connect_with_retry(&config.database)
        .await
        .wrap_err("PostgreSQL connection failed")?;

    let dispatcher =
        NotificationDispatcher::from_config(db::postgres_stores(db), &config.dispatcher)
            .wrap_err("Failed to build notification dispatcher")?;
    let router = app(dispatcher, config.app.clone());

    let address = config.server.addr;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", address))?;
    info!("Server starting on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!("Notification dispatcher stopped");
    Ok(())
}
