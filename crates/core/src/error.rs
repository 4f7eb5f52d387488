// crates/core/src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::supervisor::ProcessRole;

/// Errors from bridge/agent lifecycle operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A configuration error, surfaced before any spawn is attempted.
    #[error("{role} directory not found: {path}")]
    MissingDirectory { role: ProcessRole, path: PathBuf },

    #[error("failed to spawn {role}: {source}")]
    Spawn {
        role: ProcessRole,
        #[source]
        source: std::io::Error,
    },

    /// The bridge never reported healthy within the readiness ceiling.
    /// The spawned process has already been killed when this is returned.
    #[error("bridge did not become ready within {waited_secs}s")]
    BridgeNotReady { waited_secs: u64 },

    /// The bridge exited on its own while we were waiting for readiness.
    #[error("bridge exited unexpectedly during startup")]
    BridgeExitedDuringStartup,

    #[error("agent already running (session {0})")]
    AgentAlreadyRunning(String),

    #[error("failed to create logs directory {path}: {source}")]
    LogsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from session catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("failed to read events for session {session_id}: {source}")]
    Io {
        session_id: String,
        #[source]
        source: std::io::Error,
    },

    /// The log file exists but nothing usable could be derived from it.
    #[error("failed to load metadata for session {0}")]
    Metadata(String),
}
