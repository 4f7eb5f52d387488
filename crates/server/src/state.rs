// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use atc_deck_core::{Config, Prober, Supervisor};

/// Timeout on the screenshot proxy request; larger than a health probe
/// because the bridge renders the image on demand.
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state accessible from all route handlers.
///
/// Constructed once at host startup; the supervisor is never reachable any
/// other way, so every mutation funnels through its internal lock.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    pub config: Config,
    /// Owner of the bridge/agent process pair and the current session id.
    pub supervisor: Arc<Supervisor>,
    /// Health prober for the service-status endpoint.
    pub prober: Prober,
    /// Client for the screenshot proxy.
    pub client: reqwest::Client,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(config: Config) -> Arc<Self> {
        let prober = Prober::new(config.probe_timeout);
        let client = reqwest::Client::builder()
            .timeout(SCREENSHOT_TIMEOUT)
            .build()
            .expect("reqwest client");
        Arc::new(Self {
            start_time: Instant::now(),
            supervisor: Arc::new(Supervisor::new(config.clone())),
            config,
            prober,
            client,
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
