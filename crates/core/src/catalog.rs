// crates/core/src/catalog.rs
//! Browsable session catalog over the logs root.
//!
//! Sessions outlive their processes: the catalog enumerates log files on
//! disk, so a session whose agent died long ago is still listed and fully
//! replayable.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;
use crate::events::{Event, EventKind};
use crate::reader::{read_raw_events, session_log_path};

/// Start/end summary for one session log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    /// `session_start` timestamp, falling back to the first event's.
    pub timestamp: String,
    pub model: Option<String>,
    pub airport: Option<String>,
    /// In-game seconds elapsed, from the last `session_end`.
    pub duration_s: Option<f64>,
    /// Final score from the `session_end` summary.
    pub score: Option<i64>,
    /// Arrivals landed, from the `session_end` summary.
    pub landings: Option<i64>,
    pub event_count: usize,
}

/// Extract the session id from a file name like `events_atc_20260112_222918.jsonl`.
pub fn parse_session_id(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix("events_")
        .and_then(|rest| rest.strip_suffix(".jsonl"))
        .filter(|id| !id.is_empty())
}

/// Derive metadata for one log file, or `None` if the file is unreadable or
/// yields nothing usable. Callers listing the catalog omit such sessions
/// silently rather than failing the whole listing.
pub async fn load_session_metadata(path: &Path) -> Option<SessionMetadata> {
    let file_name = path.file_name()?.to_str()?;
    let session_id = parse_session_id(file_name)?;

    let values = match read_raw_events(path).await {
        Ok(values) => values,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "omitting unreadable session");
            return None;
        }
    };
    if values.is_empty() {
        return None;
    }
    let events: Vec<Event> = values.iter().map(Event::from_value).collect();

    // Scan forward for the first session_start, backward for the last
    // session_end; a crashed session may have a start but no end.
    let start = events.iter().find(|e| e.kind == EventKind::SessionStart);
    let end = events.iter().rev().find(|e| e.kind == EventKind::SessionEnd);

    let timestamp = start
        .map(|e| e.timestamp.clone())
        .filter(|ts| !ts.is_empty())
        .unwrap_or_else(|| events[0].timestamp.clone());

    let summary = end.and_then(|e| e.summary.as_ref());
    Some(SessionMetadata {
        session_id: session_id.to_string(),
        timestamp,
        model: start.and_then(|e| e.model.clone()),
        airport: start.and_then(|e| e.airport.clone()),
        duration_s: end.map(|e| e.game_time.unwrap_or(0.0)),
        score: summary.and_then(|s| s.get("game_score")).and_then(|v| v.as_i64()),
        landings: end.map(|_| {
            summary
                .and_then(|s| s.get("arrivals_landed"))
                .and_then(|v| v.as_i64())
                .unwrap_or(0)
        }),
        event_count: events.len(),
    })
}

/// Enumerate all sessions in the logs root, newest first.
///
/// An absent root is an empty catalog. Sorting is by recorded start
/// timestamp descending; sessions without one sort as empty-string, last.
pub async fn list_sessions(logs_root: &Path) -> Vec<SessionMetadata> {
    let mut dir = match tokio::fs::read_dir(logs_root).await {
        Ok(dir) => dir,
        Err(_) => return Vec::new(),
    };

    let mut sessions = Vec::new();
    while let Ok(Some(entry)) = dir.next_entry().await {
        let name = entry.file_name();
        if parse_session_id(&name.to_string_lossy()).is_none() {
            continue;
        }
        if let Some(metadata) = load_session_metadata(&entry.path()).await {
            sessions.push(metadata);
        }
    }

    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sessions
}

/// Metadata for one session; `SessionNotFound` if its file is absent.
pub async fn get_session(
    logs_root: &Path,
    session_id: &str,
) -> Result<SessionMetadata, CatalogError> {
    let path = session_log_path(logs_root, session_id);
    if !path.exists() {
        return Err(CatalogError::SessionNotFound(session_id.to_string()));
    }
    load_session_metadata(&path)
        .await
        .ok_or_else(|| CatalogError::Metadata(session_id.to_string()))
}

/// Full event replay for one session, verbatim in file order.
pub async fn get_session_events(
    logs_root: &Path,
    session_id: &str,
) -> Result<Vec<Value>, CatalogError> {
    let path = session_log_path(logs_root, session_id);
    if !path.exists() {
        return Err(CatalogError::SessionNotFound(session_id.to_string()));
    }
    read_raw_events(&path).await.map_err(|source| CatalogError::Io {
        session_id: session_id.to_string(),
        source,
    })
}
