// crates/core/src/metrics.rs
//! Aggregate metrics over a session's event list.

use serde::Serialize;

use crate::events::{Event, EventKind};

/// Pure function of the event list; re-deriving from a re-read of the same
/// file yields the identical value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub landings: usize,
    pub decisions: usize,
    pub conflicts: usize,
    /// `successes / total_outcomes * 100`, or 0 with no outcomes at all.
    pub success_rate: f64,
    /// Most recent `state_snapshot` score; latest wins, not max.
    pub score: i64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            landings: 0,
            decisions: 0,
            conflicts: 0,
            success_rate: 0.0,
            score: 0,
        }
    }
}

pub fn derive_metrics(events: &[Event]) -> Metrics {
    let landings = events.iter().filter(|e| e.kind == EventKind::Landing).count();
    let decisions = events.iter().filter(|e| e.kind == EventKind::Decision).count();
    let conflicts = events
        .iter()
        .filter(|e| e.kind == EventKind::ConflictDetected)
        .count();

    let outcomes: Vec<&Event> = events.iter().filter(|e| e.kind == EventKind::Outcome).collect();
    let successes = outcomes.iter().filter(|e| e.success == Some(true)).count();
    let success_rate = if outcomes.is_empty() {
        0.0
    } else {
        successes as f64 / outcomes.len() as f64 * 100.0
    };

    let score = events
        .iter()
        .filter(|e| e.kind == EventKind::StateSnapshot)
        .filter_map(|e| e.score)
        .last()
        .unwrap_or(0);

    Metrics {
        landings,
        decisions,
        conflicts,
        success_rate,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        Event::from_value(&value)
    }

    #[test]
    fn test_empty_events() {
        assert_eq!(derive_metrics(&[]), Metrics::default());
    }

    #[test]
    fn test_zero_outcomes_no_division_error() {
        let events = vec![
            event(json!({"event_type": "decision"})),
            event(json!({"event_type": "decision"})),
        ];
        let metrics = derive_metrics(&events);
        assert_eq!(metrics.decisions, 2);
        assert_eq!(metrics.success_rate, 0.0);
    }

    #[test]
    fn test_success_rate() {
        let events = vec![
            event(json!({"event_type": "outcome", "success": true})),
            event(json!({"event_type": "outcome", "success": true})),
            event(json!({"event_type": "outcome", "success": false})),
            event(json!({"event_type": "outcome"})), // missing flag counts as failure
        ];
        let metrics = derive_metrics(&events);
        assert_eq!(metrics.success_rate, 50.0);
    }

    #[test]
    fn test_score_is_latest_not_max() {
        let events = vec![
            event(json!({"event_type": "state_snapshot", "score": 10})),
            event(json!({"event_type": "state_snapshot", "score": 25})),
            event(json!({"event_type": "state_snapshot", "score": 5})),
        ];
        assert_eq!(derive_metrics(&events).score, 5);
    }

    #[test]
    fn test_score_ignores_trailing_snapshot_without_score() {
        let events = vec![
            event(json!({"event_type": "state_snapshot", "score": 10})),
            event(json!({"event_type": "state_snapshot", "score": 25})),
            event(json!({"event_type": "state_snapshot", "aircraft": 4})),
        ];
        assert_eq!(derive_metrics(&events).score, 25);
    }

    #[test]
    fn test_no_snapshots_score_zero() {
        let events = vec![event(json!({"event_type": "landing"}))];
        let metrics = derive_metrics(&events);
        assert_eq!(metrics.score, 0);
        assert_eq!(metrics.landings, 1);
    }

    #[test]
    fn test_counts() {
        let events = vec![
            event(json!({"event_type": "landing"})),
            event(json!({"event_type": "landing"})),
            event(json!({"event_type": "conflict_detected"})),
            event(json!({"event_type": "decision"})),
            event(json!({"event_type": "telemetry_blob"})),
        ];
        let metrics = derive_metrics(&events);
        assert_eq!(metrics.landings, 2);
        assert_eq!(metrics.conflicts, 1);
        assert_eq!(metrics.decisions, 1);
    }
}
