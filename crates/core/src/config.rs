// crates/core/src/config.rs
//! Environment-derived configuration with fixed defaults.
//!
//! Every external collaborator (simulator, bridge, LLM server, perception
//! service), every launch directory, and every timing knob lives here so the
//! supervisor and prober never reach for ambient `std::env` state themselves.

use std::path::PathBuf;
use std::time::Duration;

use crate::probe::{Endpoint, HealthCheck};

/// Default port the bridge binds when launched in HTTP mode.
const DEFAULT_BRIDGE_PORT: u16 = 8080;

/// Default port for the atc-deck API itself.
const DEFAULT_API_PORT: u16 = 8600;

/// Runtime configuration, built once at startup.
///
/// Fields are public and the struct is `Clone` so tests can construct it
/// directly instead of going through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the simulator (health: plain 200 on `/`).
    pub simulator_url: String,
    /// Port the bridge is told to bind; embedded in `bridge_command`.
    pub bridge_port: u16,
    /// Base URL of the bridge (health: 200 on `/health`).
    pub bridge_url: String,
    /// Base URL of the language-model server (health: 200 on `/models`).
    pub llm_url: String,
    /// Base URL of the perception service (health: 200 on `/health` with
    /// `status == "healthy"` in the body).
    pub perception_url: String,
    /// Working directory the bridge is launched from.
    pub bridge_dir: PathBuf,
    /// Working directory the agent is launched from.
    pub agent_dir: PathBuf,
    /// Root directory holding `events_<session_id>.jsonl` files.
    pub logs_dir: PathBuf,
    /// Origin of the single-page front end, for CORS.
    pub frontend_origin: String,
    /// Port the API server binds.
    pub port: u16,

    /// Command line used to launch the bridge (program first).
    pub bridge_command: Vec<String>,
    /// Base command line used to launch the agent; the supervisor appends
    /// the session, bridge URL and run flags.
    pub agent_command: Vec<String>,

    /// Per-call timeout on health-probe HTTP requests.
    pub probe_timeout: Duration,
    /// Interval between readiness probes while the bridge starts.
    pub ready_poll_interval: Duration,
    /// Number of readiness probes before giving up on the bridge.
    pub ready_attempts: u32,
    /// Grace period between SIGTERM and a forced kill.
    pub stop_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let bridge_port = DEFAULT_BRIDGE_PORT;
        Self {
            simulator_url: "http://localhost:3003".to_string(),
            bridge_port,
            bridge_url: format!("http://localhost:{bridge_port}"),
            llm_url: "http://localhost:1234/v1".to_string(),
            perception_url: "http://localhost:8001".to_string(),
            bridge_dir: PathBuf::from("../atc-bridge"),
            agent_dir: PathBuf::from("../atc-agent"),
            logs_dir: PathBuf::from("../atc-agent/logs"),
            frontend_origin: "http://localhost:5173".to_string(),
            port: DEFAULT_API_PORT,
            bridge_command: default_bridge_command(bridge_port),
            agent_command: default_agent_command(),
            probe_timeout: Duration::from_secs(2),
            ready_poll_interval: Duration::from_millis(500),
            ready_attempts: 30,
            stop_grace: Duration::from_secs(5),
        }
    }
}

fn default_bridge_command(port: u16) -> Vec<String> {
    ["uv", "run", "python", "-m", "atc_bridge", "--http", "--port"]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(port.to_string()))
        .collect()
}

fn default_agent_command() -> Vec<String> {
    ["uv", "run", "python", "-m", "atc_agent"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Split an override like `BRIDGE_CMD="uv run python -m atc_bridge"` into a
/// command vector. Whitespace-split only; paths with spaces are unsupported.
fn env_command(key: &str) -> Option<Vec<String>> {
    let raw = std::env::var(key).ok()?;
    let parts: Vec<String> = raw.split_whitespace().map(String::from).collect();
    (!parts.is_empty()).then_some(parts)
}

impl Config {
    /// Build configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let bridge_port = env_parse("BRIDGE_PORT", defaults.bridge_port);
        let bridge_url = env_string("BRIDGE_URL", &format!("http://localhost:{bridge_port}"));
        let agent_dir = PathBuf::from(env_string(
            "AGENT_DIR",
            &defaults.agent_dir.to_string_lossy(),
        ));
        let logs_dir = std::env::var("LOGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| agent_dir.join("logs"));

        Self {
            simulator_url: env_string("SIMULATOR_URL", &defaults.simulator_url),
            bridge_port,
            bridge_url,
            llm_url: env_string("LLM_URL", &defaults.llm_url),
            perception_url: env_string("PERCEPTION_URL", &defaults.perception_url),
            bridge_dir: PathBuf::from(env_string(
                "BRIDGE_DIR",
                &defaults.bridge_dir.to_string_lossy(),
            )),
            agent_dir,
            logs_dir,
            frontend_origin: env_string("FRONTEND_ORIGIN", &defaults.frontend_origin),
            port: env_parse("ATC_DECK_PORT", env_parse("PORT", defaults.port)),
            bridge_command: env_command("BRIDGE_CMD")
                .unwrap_or_else(|| default_bridge_command(bridge_port)),
            agent_command: env_command("AGENT_CMD").unwrap_or(defaults.agent_command),
            probe_timeout: defaults.probe_timeout,
            ready_poll_interval: defaults.ready_poll_interval,
            ready_attempts: defaults.ready_attempts,
            stop_grace: defaults.stop_grace,
        }
    }

    /// The simulator endpoint: reachable means healthy.
    pub fn simulator_endpoint(&self) -> Endpoint {
        Endpoint {
            name: "simulator",
            url: self.simulator_url.clone(),
            health_path: "",
            check: HealthCheck::StatusOk,
        }
    }

    /// The bridge endpoint, also used as the readiness signal at startup.
    pub fn bridge_endpoint(&self) -> Endpoint {
        Endpoint {
            name: "bridge",
            url: self.bridge_url.clone(),
            health_path: "/health",
            check: HealthCheck::StatusOk,
        }
    }

    /// The language-model server endpoint.
    pub fn llm_endpoint(&self) -> Endpoint {
        Endpoint {
            name: "llm",
            url: self.llm_url.clone(),
            health_path: "/models",
            check: HealthCheck::StatusOk,
        }
    }

    /// The perception service endpoint. A 200 alone is not enough: the
    /// service accepts connections before its model is loaded, so the body
    /// must also report `status == "healthy"`.
    pub fn perception_endpoint(&self) -> Endpoint {
        Endpoint {
            name: "perception",
            url: self.perception_url.clone(),
            health_path: "/health",
            check: HealthCheck::BodyField {
                field: "status",
                expect: "healthy",
            },
        }
    }
}
