// crates/core/src/decisions.rs
//! Decision-and-outcome log derived from a session's events.

use std::collections::HashMap;

use serde::Serialize;

use crate::events::{Event, EventKind};

/// One issued command with its (possibly still pending) outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub callsign: String,
    /// Rendered as `<TYPE> <value>`, e.g. `ALTITUDE 5000`.
    pub command: String,
    /// `None` while no matching outcome has been observed yet.
    pub success: Option<bool>,
    pub error: String,
}

/// Join `decision` events to their `outcome` by `correlation_id`.
///
/// Outcomes are indexed first, last-wins on duplicate correlation ids, then
/// decisions are emitted in original file order. A decision with no matching
/// outcome is still reported, with `success: None`.
pub fn derive_decisions(events: &[Event]) -> Vec<DecisionRecord> {
    let mut outcomes: HashMap<&str, &Event> = HashMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::Outcome) {
        if let Some(id) = event.correlation_id.as_deref() {
            outcomes.insert(id, event);
        }
    }

    events
        .iter()
        .filter(|e| e.kind == EventKind::Decision)
        .map(|decision| {
            let outcome = decision
                .correlation_id
                .as_deref()
                .and_then(|id| outcomes.get(id));
            let command_type = decision.command_type.as_deref().unwrap_or("???");
            let command_value = decision.command_value.as_deref().unwrap_or("");
            DecisionRecord {
                callsign: decision
                    .callsign
                    .clone()
                    .unwrap_or_else(|| "???".to_string()),
                command: format!("{} {}", command_type.to_uppercase(), command_value),
                success: outcome.and_then(|o| o.success),
                error: outcome
                    .and_then(|o| o.error.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        Event::from_value(&value)
    }

    #[test]
    fn test_decision_with_outcome() {
        let events = vec![
            event(json!({
                "event_type": "decision", "correlation_id": "c1",
                "callsign": "UAL123", "command_type": "altitude", "command_value": "5000",
            })),
            event(json!({"event_type": "outcome", "correlation_id": "c1", "success": true})),
        ];
        let records = derive_decisions(&events);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].callsign, "UAL123");
        assert_eq!(records[0].command, "ALTITUDE 5000");
        assert_eq!(records[0].success, Some(true));
        assert_eq!(records[0].error, "");
    }

    #[test]
    fn test_decision_without_outcome_is_pending() {
        let events = vec![event(json!({
            "event_type": "decision", "correlation_id": "c1",
            "callsign": "DAL9", "command_type": "heading", "command_value": "270",
        }))];
        let records = derive_decisions(&events);
        assert_eq!(records[0].success, None);
    }

    #[test]
    fn test_duplicate_outcomes_last_wins() {
        let events = vec![
            event(json!({
                "event_type": "decision", "correlation_id": "X",
                "callsign": "SWA4", "command_type": "speed", "command_value": "210",
            })),
            event(json!({
                "event_type": "outcome", "correlation_id": "X",
                "success": false, "error": "rejected",
            })),
            event(json!({"event_type": "outcome", "correlation_id": "X", "success": true})),
        ];
        let records = derive_decisions(&events);
        assert_eq!(records[0].success, Some(true));
        assert_eq!(records[0].error, "");
    }

    #[test]
    fn test_outcome_before_decision_still_matches() {
        // Matching is by correlation id, not by file position.
        let events = vec![
            event(json!({"event_type": "outcome", "correlation_id": "c1", "success": false, "error": "too low"})),
            event(json!({
                "event_type": "decision", "correlation_id": "c1",
                "callsign": "AAL2", "command_type": "descend", "command_value": "3000",
            })),
        ];
        let records = derive_decisions(&events);
        assert_eq!(records[0].success, Some(false));
        assert_eq!(records[0].error, "too low");
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let events = vec![event(json!({"event_type": "decision"}))];
        let records = derive_decisions(&events);
        assert_eq!(records[0].callsign, "???");
        assert_eq!(records[0].command, "??? ");
    }

    #[test]
    fn test_order_preserved() {
        let events = vec![
            event(json!({"event_type": "decision", "callsign": "A1", "command_type": "t"})),
            event(json!({"event_type": "landing"})),
            event(json!({"event_type": "decision", "callsign": "B2", "command_type": "t"})),
        ];
        let records = derive_decisions(&events);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].callsign, "A1");
        assert_eq!(records[1].callsign, "B2");
    }
}
