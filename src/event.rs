//! Time-stamped events flowing through a pipeline.
//!
//! An `Event` is a UTC timestamp plus a flat map of named JSON values. Events
//! are cheap to clone and are passed by value between chain links.

use crate::pipeline::error::{PipelineError, PipelineResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single time-series event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    /// Create an event from a timestamp and a data map.
    pub fn new(timestamp: DateTime<Utc>, data: Map<String, Value>) -> Self {
        Self { timestamp, data }
    }

    /// Create an empty event at `millis` since the Unix epoch.
    ///
    /// Out-of-range values clamp to the epoch.
    pub fn at_millis(millis: i64) -> Self {
        let timestamp = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default();
        Self {
            timestamp,
            data: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Numeric view of a field. Integers widen to `f64`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    #[inline]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Parse one JSON line: `{"timestamp": "<rfc3339>", "data": {...}}`.
    pub fn from_json_line(line: &str) -> PipelineResult<Self> {
        serde_json::from_str(line.trim()).map_err(PipelineError::from)
    }

    pub fn to_json_line(&self) -> PipelineResult<String> {
        serde_json::to_string(self).map_err(PipelineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_fields() {
        let event = Event::at_millis(1_000).with("value", 42).with("host", "a");
        assert_eq!(event.timestamp_millis(), 1_000);
        assert_eq!(event.get_f64("value"), Some(42.0));
        assert_eq!(event.get("host"), Some(&json!("a")));
        assert!(event.get("missing").is_none());
    }

    #[test]
    fn test_event_json_line() {
        let line = r#"{"timestamp":"2024-01-01T00:00:00Z","data":{"value":1.5}}"#;
        let event = Event::from_json_line(line).unwrap();
        assert_eq!(event.get_f64("value"), Some(1.5));
        assert_eq!(event.timestamp_millis(), 1_704_067_200_000);

        let reparsed = Event::from_json_line(&event.to_json_line().unwrap()).unwrap();
        assert_eq!(reparsed, event);
    }

    #[test]
    fn test_event_json_line_without_data() {
        let event = Event::from_json_line(r#"{"timestamp":"2024-01-01T00:00:00Z"}"#).unwrap();
        assert!(event.data.is_empty());
    }

    #[test]
    fn test_event_json_line_rejects_garbage() {
        assert!(matches!(
            Event::from_json_line("not json"),
            Err(PipelineError::Json(_))
        ));
    }
}
