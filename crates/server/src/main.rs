use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod emission;
mod interpreter;
mod session;
mod store;
mod ws;

use app_state::AppState;
use config::{allowed_origin, load_settings, validate_settings};
use emission::FrameRelay;
use store::StateStore;

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    install_panic_hook();

    let settings = load_settings();
    validate_settings(&settings)?;
    let origin = allowed_origin(&settings.frontend_url)?;

    let state = AppState {
        store: StateStore::new(settings.initial_boat_state()),
        relay: FrameRelay::new(settings.frame_relay_capacity),
        outbox_capacity: settings.outbox_capacity,
        max_frame_bytes: settings.max_frame_bytes,
    };
    let app = build_router(Arc::new(state), origin);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, frontend_url = %settings.frontend_url, "server running");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Panics inside connection tasks are contained by the runtime; this makes
/// sure they are logged and the process keeps serving.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        error!(%panic, "uncaught panic");
    }));
}

fn build_router(state: Arc<AppState>, origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
