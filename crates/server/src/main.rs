// crates/server/src/main.rs
//! atc-deck server binary.

use std::time::Duration;

use atc_deck_server::{create_app, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,atc_deck=info")),
        )
        .init();

    let config = atc_deck_core::Config::from_env();
    let port = config.port;
    info!(
        logs_dir = %config.logs_dir.display(),
        bridge_url = %config.bridge_url,
        "starting atc-deck server"
    );

    let state = AppState::new(config);

    // Background reaper: notices bridge/agent exits between API calls so
    // /api/agent/status stays truthful without a request-time wait.
    let supervisor = state.supervisor.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(2));
        loop {
            interval.tick().await;
            supervisor.reap_exited().await;
        }
    });

    let app = create_app(state.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("atc-deck listening on http://0.0.0.0:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Leave no orphaned child processes behind.
    warn!("shutting down, stopping supervised processes");
    state.supervisor.stop_all().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to install ctrl-c handler");
    }
}
