// crates/server/src/routes/agent.rs
//! Agent lifecycle endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use atc_deck_core::AgentOptions;

use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/agent/start.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    /// Game speed multiplier.
    pub timewarp: u32,
    /// Decision-loop iteration limit.
    pub cycles: u32,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub airport: Option<String>,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            timewarp: 10,
            cycles: 100,
            model: None,
            base_url: None,
            airport: None,
        }
    }
}

impl From<StartRequest> for AgentOptions {
    fn from(req: StartRequest) -> Self {
        Self {
            session_id: None,
            timewarp: req.timewarp,
            cycles: req.cycles,
            model: req.model,
            base_url: req.base_url,
            airport: req.airport,
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct StartResponse {
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct StopResponse {
    pub status: String,
}

/// Agent status response. The `mcp_running` wire name predates the bridge
/// rename and is kept for front-end compatibility.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct StatusResponse {
    pub running: bool,
    pub session_id: Option<String>,
    #[serde(rename = "mcp_running")]
    pub bridge_running: bool,
}

/// POST /api/agent/start - Start the bridge (if needed) then the agent.
///
/// 400 when an agent is already running; 500 with detail when a launch
/// directory is missing or startup fails.
pub async fn start_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> ApiResult<Json<StartResponse>> {
    let session_id = state.supervisor.start_agent(request.into()).await?;
    Ok(Json(StartResponse {
        status: "started".to_string(),
        session_id,
    }))
}

/// POST /api/agent/stop - Stop agent then bridge. Idempotent; succeeds even
/// when nothing is running.
pub async fn stop_agent(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    state.supervisor.stop_all().await;
    Json(StopResponse {
        status: "stopped".to_string(),
    })
}

/// GET /api/agent/status - Current supervisor status.
pub async fn agent_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.supervisor.status().await;
    Json(StatusResponse {
        running: status.running,
        session_id: status.session_id,
        bridge_running: status.bridge_running,
    })
}

/// Create the agent routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agent/start", post(start_agent))
        .route("/agent/stop", post(stop_agent))
        .route("/agent/status", get(agent_status))
}
