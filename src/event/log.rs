//! Execution events and the append-only EventLog
//!
//! - `ExecutionEvent`: one item of the run stream
//! - `EventType`: seven kinds, flow-level and node-level
//! - `EventLog`: thread-safe collector for everything a run emitted

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FlowStart,
    NodeStart,
    NodeSkipped,
    NodeOutput,
    NodeComplete,
    Error,
    FlowComplete,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlowStart => "flow_start",
            Self::NodeStart => "node_start",
            Self::NodeSkipped => "node_skipped",
            Self::NodeOutput => "node_output",
            Self::NodeComplete => "node_complete",
            Self::Error => "error",
            Self::FlowComplete => "flow_complete",
        }
    }

    /// `flow_start`, `flow_complete`, and `error` end or frame a run
    pub fn is_flow_event(&self) -> bool {
        matches!(self, Self::FlowStart | Self::FlowComplete | Self::Error)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single event of an execution stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub node_id: Option<String>,
    pub flow_id: String,
    pub data: Option<Value>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionEvent {
    pub fn new(event_type: EventType, flow_id: impl Into<String>) -> Self {
        Self {
            event_type,
            node_id: None,
            flow_id: flow_id.into(),
            data: None,
            message: String::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    // ═══════════════════════════════════════════
    // CONSTRUCTORS PER KIND
    // ═══════════════════════════════════════════

    pub fn flow_start(flow_id: &str, flow_name: &str) -> Self {
        Self::new(EventType::FlowStart, flow_id)
            .with_message(format!("Starting flow: {}", flow_name))
    }

    pub fn node_start(flow_id: &str, node_id: &str, node_type: &str) -> Self {
        Self::new(EventType::NodeStart, flow_id)
            .with_node(node_id)
            .with_message(format!("Executing {} node", node_type))
    }

    pub fn node_skipped(flow_id: &str, node_id: &str) -> Self {
        Self::new(EventType::NodeSkipped, flow_id)
            .with_node(node_id)
            .with_message("Skipped (branch not taken)")
    }

    pub fn node_output(flow_id: &str, node_id: &str, data: Value) -> Self {
        Self::new(EventType::NodeOutput, flow_id)
            .with_node(node_id)
            .with_data(data)
    }

    pub fn node_complete(flow_id: &str, node_id: &str) -> Self {
        Self::new(EventType::NodeComplete, flow_id)
            .with_node(node_id)
            .with_message("Completed")
    }

    pub fn error(flow_id: &str, node_id: &str, message: impl Into<String>) -> Self {
        Self::new(EventType::Error, flow_id)
            .with_node(node_id)
            .with_message(message)
    }

    pub fn flow_complete(flow_id: &str, final_output: String) -> Self {
        Self::new(EventType::FlowComplete, flow_id)
            .with_data(Value::String(final_output))
            .with_message("Flow execution completed")
    }

    /// Text form of `data` (strings unquoted, other JSON compact)
    pub fn data_text(&self) -> Option<String> {
        self.data.as_ref().map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Thread-safe, append-only event log
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<RwLock<Vec<ExecutionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn record(&self, event: ExecutionEvent) -> usize {
        let mut events = self.events.write();
        events.push(event);
        events.len() - 1
    }

    /// Get all events (cloned - use `with_events` for zero-copy access)
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.read().clone()
    }

    /// Holds read lock for duration of callback - keep it short.
    pub fn with_events<T>(&self, f: impl FnOnce(&[ExecutionEvent]) -> T) -> T {
        f(&self.events.read())
    }

    /// Events for a single node, in emission order
    pub fn filter_node(&self, node_id: &str) -> Vec<ExecutionEvent> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.node_id.as_deref() == Some(node_id))
                .cloned()
                .collect()
        })
    }

    /// Kinds in emission order
    pub fn types(&self) -> Vec<EventType> {
        self.with_events(|events| events.iter().map(|e| e.event_type).collect())
    }

    /// Last event of the given kind
    pub fn last_of(&self, event_type: EventType) -> Option<ExecutionEvent> {
        self.with_events(|events| {
            events
                .iter()
                .rev()
                .find(|e| e.event_type == event_type)
                .cloned()
        })
    }

    pub fn to_json(&self) -> Value {
        self.with_events(|events| serde_json::to_value(events).unwrap_or(Value::Null))
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ExecutionEvent::node_output("flow-1", "agent-1", json!("hello"));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "node_output");
        assert_eq!(json["node_id"], "agent-1");
        assert_eq!(json["flow_id"], "flow-1");
        assert_eq!(json["data"], "hello");
        // RFC 3339 timestamp
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_flow_events_have_null_node() {
        let json = serde_json::to_value(ExecutionEvent::flow_start("f", "Demo")).unwrap();
        assert!(json["node_id"].is_null());
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "Starting flow: Demo");
    }

    #[test]
    fn test_data_text() {
        let text = ExecutionEvent::flow_complete("f", "done".into());
        assert_eq!(text.data_text().as_deref(), Some("done"));

        let structured = ExecutionEvent::node_output("f", "n", json!({"k": 1}));
        assert_eq!(structured.data_text().as_deref(), Some(r#"{"k":1}"#));

        assert!(ExecutionEvent::node_complete("f", "n").data_text().is_none());
    }

    #[test]
    fn test_event_log_record_and_filter() {
        let log = EventLog::new();
        assert!(log.is_empty());

        assert_eq!(log.record(ExecutionEvent::flow_start("f", "Demo")), 0);
        log.record(ExecutionEvent::node_start("f", "a", "input"));
        log.record(ExecutionEvent::node_start("f", "b", "agent"));
        log.record(ExecutionEvent::node_complete("f", "a"));

        assert_eq!(log.len(), 4);
        assert_eq!(log.filter_node("a").len(), 2);
        assert_eq!(
            log.types(),
            vec![
                EventType::FlowStart,
                EventType::NodeStart,
                EventType::NodeStart,
                EventType::NodeComplete
            ]
        );
        assert_eq!(
            log.last_of(EventType::NodeStart).unwrap().node_id.as_deref(),
            Some("b")
        );
        assert_eq!(log.to_json().as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_event_log_clone_shares_storage() {
        let log = EventLog::new();
        let other = log.clone();
        other.record(ExecutionEvent::flow_start("f", "x"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_flow_event_classification() {
        assert!(EventType::Error.is_flow_event());
        assert!(!EventType::NodeSkipped.is_flow_event());
        assert_eq!(EventType::NodeSkipped.to_string(), "node_skipped");
    }
}
