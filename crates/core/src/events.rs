// crates/core/src/events.rs
//! Typed view over one JSONL event line.
//!
//! The agent's log format is append-only and loosely schemaed: fields come
//! and go between agent versions. Extraction is therefore field-by-field
//! from the raw JSON value, so a missing or wrongly-typed optional field
//! degrades to `None` instead of discarding the whole line.

use serde::Serialize;
use serde_json::Value;

/// Known event types. Anything else is carried as `Other` and ignored by
/// the derived views, but still counts toward replay/event totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    Decision,
    Outcome,
    StateSnapshot,
    Landing,
    ConflictDetected,
    Other,
}

impl EventKind {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("session_start") => Self::SessionStart,
            Some("session_end") => Self::SessionEnd,
            Some("decision") => Self::Decision,
            Some("outcome") => Self::Outcome,
            Some("state_snapshot") => Self::StateSnapshot,
            Some("landing") => Self::Landing,
            Some("conflict_detected") => Self::ConflictDetected,
            _ => Self::Other,
        }
    }
}

/// One parsed event. All type-specific fields are optional.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub kind: EventKind,
    /// Wall-clock timestamp string; empty when the line carried none.
    pub timestamp: String,
    /// In-game elapsed seconds at the time of the event.
    pub game_time: Option<f64>,
    /// Links a `decision` to its later `outcome`.
    pub correlation_id: Option<String>,
    pub callsign: Option<String>,
    pub command_type: Option<String>,
    pub command_value: Option<String>,
    pub success: Option<bool>,
    pub error: Option<String>,
    /// Game score on `state_snapshot` events.
    pub score: Option<i64>,
    /// Model identifier from `session_start` metadata.
    pub model: Option<String>,
    /// Airport identifier from `session_start` metadata.
    pub airport: Option<String>,
    /// End-of-session summary object on `session_end` events.
    pub summary: Option<Value>,
}

fn get_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

impl Event {
    /// Build a typed event from a raw JSON line value.
    pub fn from_value(value: &Value) -> Self {
        let metadata = value.get("metadata");
        Self {
            kind: EventKind::parse(value.get("event_type").and_then(|v| v.as_str())),
            timestamp: get_str(value, "timestamp").unwrap_or_default(),
            game_time: value.get("game_time").and_then(|v| v.as_f64()),
            correlation_id: get_str(value, "correlation_id"),
            callsign: get_str(value, "callsign"),
            command_type: get_str(value, "command_type"),
            command_value: get_str(value, "command_value"),
            success: value.get("success").and_then(|v| v.as_bool()),
            error: get_str(value, "error"),
            score: value.get("score").and_then(|v| v.as_i64()),
            model: metadata.and_then(|m| get_str(m, "model")),
            airport: metadata.and_then(|m| get_str(m, "airport")),
            summary: value.get("summary").cloned(),
        }
    }
}
