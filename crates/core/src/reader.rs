// crates/core/src/reader.rs
//! Line-by-line JSONL reading of session event logs.
//!
//! The log file is written by the external agent and only ever read here.
//! Consumers must tolerate a partial trailing line (agent killed mid-write),
//! so a line that fails to parse is skipped, never fatal.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::events::Event;

/// File name for a session's event log: `events_<session_id>.jsonl`.
pub fn events_file_name(session_id: &str) -> String {
    format!("events_{session_id}.jsonl")
}

/// Full path of a session's event log inside the logs root.
pub fn session_log_path(logs_root: &Path, session_id: &str) -> PathBuf {
    logs_root.join(events_file_name(session_id))
}

/// Read every parseable JSON line from a log file, preserving file order.
///
/// Malformed lines are skipped with a debug log. I/O errors (including a
/// missing file) surface to the caller, which decides whether absence is an
/// empty result, a 404, or a session to omit.
pub async fn read_raw_events(path: &Path) -> std::io::Result<Vec<Value>> {
    let file = File::open(path).await?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let mut events = Vec::new();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => events.push(value),
            Err(err) => {
                debug!(path = %path.display(), line = line_number, error = %err, "skipping malformed event line");
            }
        }
    }
    Ok(events)
}

/// Typed events for a session, empty when the session has no log yet.
///
/// This is the live-view entry point: the log file appears lazily once the
/// agent emits its first event, so absence (of the file or of the whole logs
/// root) is a normal state, not an error.
pub async fn read_events(logs_root: &Path, session_id: &str) -> Vec<Event> {
    let path = session_log_path(logs_root, session_id);
    match read_raw_events(&path).await {
        Ok(values) => values.iter().map(Event::from_value).collect(),
        Err(_) => Vec::new(),
    }
}
