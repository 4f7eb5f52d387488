// crates/server/src/routes/sessions.rs
//! Session catalog and event replay endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use atc_deck_core::{catalog, SessionMetadata};

use crate::error::ApiResult;
use crate::state::AppState;

/// Response for GET /api/sessions/{id}/events.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct SessionEventsResponse {
    pub session_id: String,
    pub events: Vec<Value>,
    pub count: usize,
}

/// GET /api/sessions - List all sessions, newest first.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionMetadata>> {
    Json(catalog::list_sessions(&state.config.logs_dir).await)
}

/// GET /api/sessions/{id} - Metadata for one session; 404 if absent.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionMetadata>> {
    let metadata = catalog::get_session(&state.config.logs_dir, &session_id).await?;
    Ok(Json(metadata))
}

/// GET /api/sessions/{id}/events - Full event replay, verbatim file order.
pub async fn get_session_events(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionEventsResponse>> {
    let events = catalog::get_session_events(&state.config.logs_dir, &session_id).await?;
    Ok(Json(SessionEventsResponse {
        count: events.len(),
        session_id,
        events,
    }))
}

/// Create the sessions routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/events", get(get_session_events))
}
