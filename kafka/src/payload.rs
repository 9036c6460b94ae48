//! Payload strategies: schema-registry JSON records or bare UTF-8 text.

use crate::error::{KafkaError, Result};
use crate::json_serde::{JsonDeserializer, JsonSerializer};
use kafka_messages::StructuredMessage;
use std::fmt;

/// Selects how record values are encoded and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PayloadMode {
    /// `StructuredMessage` as registry-framed JSON with a string key.
    Structured,
    /// Bare UTF-8 text without a key.
    Plain,
}

impl fmt::Display for PayloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadMode::Structured => f.write_str("structured"),
            PayloadMode::Plain => f.write_str("plain"),
        }
    }
}

/// A record ready to hand to the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    pub key: Option<String>,
    pub value: Vec<u8>,
    /// Human-readable form of the value for delivery reports.
    pub display: String,
}

/// Encodes the demo record and renders consumed record values.
pub enum PayloadStrategy {
    Structured {
        serializer: JsonSerializer,
        deserializer: JsonDeserializer,
        key: String,
    },
    Plain {
        text: String,
    },
}

impl PayloadStrategy {
    pub fn structured(serializer: JsonSerializer, key: impl Into<String>) -> Self {
        PayloadStrategy::Structured {
            serializer,
            deserializer: JsonDeserializer::new(),
            key: key.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        PayloadStrategy::Plain { text: text.into() }
    }

    pub fn mode(&self) -> PayloadMode {
        match self {
            PayloadStrategy::Structured { .. } => PayloadMode::Structured,
            PayloadStrategy::Plain { .. } => PayloadMode::Plain,
        }
    }

    /// Builds and encodes the record the demo produces for `topic`.
    ///
    /// In structured mode this registers the message schema, so it needs a reachable
    /// registry.
    pub async fn encode_demo(&self, topic: &str) -> Result<EncodedRecord> {
        match self {
            PayloadStrategy::Structured {
                serializer, key, ..
            } => {
                let message = StructuredMessage::hello();
                let value = serializer.serialize(topic, &message).await?;
                Ok(EncodedRecord {
                    key: Some(key.clone()),
                    value,
                    display: message.to_string(),
                })
            }
            PayloadStrategy::Plain { text } => Ok(EncodedRecord {
                key: None,
                value: text.as_bytes().to_vec(),
                display: text.clone(),
            }),
        }
    }

    /// Renders a consumed record value as a report line body.
    pub fn decode(&self, payload: Option<&[u8]>) -> Result<String> {
        match self {
            PayloadStrategy::Structured { deserializer, .. } => {
                let payload = payload.ok_or_else(|| {
                    KafkaError::Deserialization("record has no payload".into())
                })?;
                let message: StructuredMessage = deserializer.deserialize(payload)?;
                Ok(message.to_string())
            }
            PayloadStrategy::Plain { .. } => match payload {
                None => Ok(String::new()),
                Some(bytes) => std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|e| KafkaError::Deserialization(e.to_string())),
            },
        }
    }
}
