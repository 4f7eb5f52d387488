// crates/server/src/routes/health.rs
//! Service health aggregation and the screenshot proxy.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use atc_deck_core::Endpoint;

use crate::state::AppState;

/// One external service's reachability, rendered for the front end.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ServiceStatus {
    pub url: String,
    /// `"running"` or `"offline"`; unreachability is a status, never an error.
    pub status: String,
}

impl ServiceStatus {
    fn new(endpoint: &Endpoint, healthy: bool) -> Self {
        Self {
            url: endpoint.url.clone(),
            status: if healthy { "running" } else { "offline" }.to_string(),
        }
    }
}

/// Response for GET /api/health.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    pub simulator: ServiceStatus,
    pub bridge: ServiceStatus,
    pub llm: ServiceStatus,
    pub perception: ServiceStatus,
}

/// GET /api/health - Probe all four services concurrently.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let simulator = state.config.simulator_endpoint();
    let bridge = state.config.bridge_endpoint();
    let llm = state.config.llm_endpoint();
    let perception = state.config.perception_endpoint();

    let (simulator_ok, bridge_ok, llm_ok, perception_ok) = tokio::join!(
        state.prober.probe(&simulator),
        state.prober.probe(&bridge),
        state.prober.probe(&llm),
        state.prober.probe(&perception),
    );

    Json(HealthResponse {
        simulator: ServiceStatus::new(&simulator, simulator_ok),
        bridge: ServiceStatus::new(&bridge, bridge_ok),
        llm: ServiceStatus::new(&llm, llm_ok),
        perception: ServiceStatus::new(&perception, perception_ok),
    })
}

/// GET /api/screenshot - Proxy the bridge's screenshot endpoint.
///
/// Passes through the bridge's status and content-type; an unreachable
/// bridge is a 503 with a human-readable body.
pub async fn screenshot(State(state): State<Arc<AppState>>) -> Response {
    let url = format!(
        "{}/screenshot",
        state.config.bridge_url.trim_end_matches('/')
    );
    match state.client.get(&url).send().await {
        Ok(resp) => {
            let status = StatusCode::from_u16(resp.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            if status != StatusCode::OK {
                return status.into_response();
            }
            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("image/png")
                .to_string();
            match resp.bytes().await {
                Ok(bytes) => {
                    ([(header::CONTENT_TYPE, content_type)], bytes.to_vec()).into_response()
                }
                Err(err) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("Bridge unavailable: {err}"),
                )
                    .into_response(),
            }
        }
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Bridge unavailable: {err}"),
        )
            .into_response(),
    }
}

/// Create the health routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/screenshot", get(screenshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_rendering() {
        let endpoint = Endpoint {
            name: "simulator",
            url: "http://localhost:3003".to_string(),
            health_path: "",
            check: atc_deck_core::HealthCheck::StatusOk,
        };
        let up = ServiceStatus::new(&endpoint, true);
        assert_eq!(up.status, "running");
        let down = ServiceStatus::new(&endpoint, false);
        assert_eq!(down.status, "offline");
        assert_eq!(down.url, "http://localhost:3003");
    }

    #[test]
    fn test_health_response_serialization() {
        let endpoint = Endpoint {
            name: "bridge",
            url: "http://localhost:8080".to_string(),
            health_path: "/health",
            check: atc_deck_core::HealthCheck::StatusOk,
        };
        let response = HealthResponse {
            simulator: ServiceStatus::new(&endpoint, true),
            bridge: ServiceStatus::new(&endpoint, false),
            llm: ServiceStatus::new(&endpoint, false),
            perception: ServiceStatus::new(&endpoint, false),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"simulator\":{\"url\""));
        assert!(json.contains("\"status\":\"offline\""));
    }
}
