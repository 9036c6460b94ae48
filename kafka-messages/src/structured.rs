//! The structured demo record.

use crate::KafkaMessage;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A JSON record with a required id, optional text and a required UTC timestamp.
///
/// `id` and `timestamp` must be present when deserializing; `text` falls back to an
/// empty string when absent or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredMessage {
    pub id: i32,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,

    pub timestamp: DateTime<Utc>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl StructuredMessage {
    /// Creates a message stamped with the current UTC time.
    pub fn new(id: i32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// The message produced by the demo run.
    pub fn hello() -> Self {
        Self::new(1, "Hello Kafka!")
    }
}

impl KafkaMessage for StructuredMessage {
    const TOPIC: &'static str = "test-topic";

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "StructuredMessage",
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "text": { "type": ["string", "null"] },
                "timestamp": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "timestamp"]
        })
    }
}

impl fmt::Display for StructuredMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.id,
            self.text,
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> StructuredMessage {
        StructuredMessage {
            id: 1,
            text: "Hello Kafka!".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn serializes_with_lowercase_field_names() {
        let json = serde_json::to_value(fixed()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["text"], "Hello Kafka!");
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn round_trip_preserves_fields() {
        let msg = StructuredMessage::hello();
        let json = serde_json::to_string(&msg).unwrap();
        let back: StructuredMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn missing_text_defaults_to_empty() {
        let msg: StructuredMessage =
            serde_json::from_str(r#"{"id": 7, "timestamp": "2024-05-01T12:30:00Z"}"#).unwrap();
        assert_eq!(msg.id, 7);
        assert_eq!(msg.text, "");
    }

    #[test]
    fn null_text_defaults_to_empty() {
        let msg: StructuredMessage = serde_json::from_str(
            r#"{"id": 1, "text": null, "timestamp": "2024-05-01T12:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.text, "");
        assert_eq!(msg.to_string(), "1 |  | 2024-05-01T12:30:00Z");
    }

    #[test]
    fn non_string_text_is_rejected() {
        let result = serde_json::from_str::<StructuredMessage>(
            r#"{"id": 1, "text": 5, "timestamp": "2024-05-01T12:30:00Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_id_is_rejected() {
        let result = serde_json::from_str::<StructuredMessage>(
            r#"{"text": "x", "timestamp": "2024-05-01T12:30:00Z"}"#,
        );
        assert!(result.unwrap_err().to_string().contains("missing field `id`"));
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let result = serde_json::from_str::<StructuredMessage>(r#"{"id": 1, "text": "x"}"#);
        assert!(result.unwrap_err().to_string().contains("missing field `timestamp`"));
    }

    #[test]
    fn id_type_mismatch_is_rejected() {
        let result = serde_json::from_str::<StructuredMessage>(
            r#"{"id": "one", "timestamp": "2024-05-01T12:30:00Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn display_renders_pipe_separated_fields() {
        assert_eq!(fixed().to_string(), "1 | Hello Kafka! | 2024-05-01T12:30:00Z");
    }

    #[test]
    fn schema_requires_id_and_timestamp() {
        let schema = StructuredMessage::json_schema();
        assert_eq!(schema["required"], serde_json::json!(["id", "timestamp"]));
    }
}
