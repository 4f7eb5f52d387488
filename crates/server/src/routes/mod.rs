// crates/server/src/routes/mod.rs
//! API route handlers for the atc-deck server.

pub mod agent;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

/// GET / - API info.
async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "atc-deck",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "endpoints": {
            "sessions": "/api/sessions",
            "health": "/api/health",
            "screenshot": "/api/screenshot",
            "agent": "/api/agent/{start,stop,status}",
        },
    }))
}

/// Create the combined router with all routes under /api prefix.
///
/// Routes:
/// - GET  /                          - API info
/// - GET  /api/health                - Per-service health status
/// - GET  /api/screenshot            - Screenshot proxied from the bridge
/// - POST /api/agent/start           - Start bridge (if needed) then agent
/// - POST /api/agent/stop            - Stop agent then bridge (idempotent)
/// - GET  /api/agent/status          - Supervisor status
/// - GET  /api/sessions              - Session catalog, newest first
/// - GET  /api/sessions/{id}         - Session metadata
/// - GET  /api/sessions/{id}/events  - Full event replay
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", health::router())
        .nest("/api", agent::router())
        .nest("/api", sessions::router())
        .with_state(state)
}
