//! JSON serializer and deserializer using the schema registry wire framing.
//!
//! Framed payloads start with a zero magic byte and the 4-byte big-endian schema id,
//! followed by the UTF-8 JSON document.

use crate::error::{KafkaError, Result};
use crate::schema_registry::SchemaRegistryClient;
use kafka_messages::KafkaMessage;
use std::sync::Arc;
use tracing::debug;

const MAGIC_BYTE: u8 = 0;
const HEADER_LEN: usize = 5;

/// Registry subject for a topic's message values.
pub fn value_subject(topic: &str) -> String {
    format!("{}-value", topic)
}

/// Serializes typed messages to registry-framed JSON.
///
/// The schema of each message type is registered on first use; the registry client's
/// cache makes later calls local.
pub struct JsonSerializer {
    registry: Arc<SchemaRegistryClient>,
    buffer_bytes: usize,
}

impl JsonSerializer {
    pub fn new(registry: Arc<SchemaRegistryClient>, buffer_bytes: usize) -> Self {
        Self {
            registry,
            buffer_bytes,
        }
    }

    pub async fn serialize<T: KafkaMessage>(&self, topic: &str, message: &T) -> Result<Vec<u8>> {
        let schema = T::json_schema().to_string();
        let schema_id = self
            .registry
            .register_schema(&value_subject(topic), &schema)
            .await?;

        let mut buf = Vec::with_capacity(self.buffer_bytes.max(HEADER_LEN));
        write_frame(&mut buf, schema_id, message)?;
        debug!(
            "Serialized message for topic '{}' with schema id {} ({} bytes)",
            topic,
            schema_id,
            buf.len()
        );
        Ok(buf)
    }
}

fn write_frame<T: KafkaMessage>(buf: &mut Vec<u8>, schema_id: u32, message: &T) -> Result<()> {
    buf.push(MAGIC_BYTE);
    buf.extend_from_slice(&schema_id.to_be_bytes());
    serde_json::to_writer(&mut *buf, message)
        .map_err(|e| KafkaError::Serialization(e.to_string()))
}

/// Deserializes registry-framed JSON into typed messages.
///
/// The embedded schema id is not resolved against the registry; the target type's
/// serde contract decides which documents are valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDeserializer;

impl JsonDeserializer {
    pub fn new() -> Self {
        Self
    }

    pub fn deserialize<T: KafkaMessage>(&self, payload: &[u8]) -> Result<T> {
        let (_schema_id, json) = split_frame(payload)?;
        serde_json::from_slice(json).map_err(|e| KafkaError::Deserialization(e.to_string()))
    }
}

/// Splits a framed payload into its schema id and JSON body.
pub fn split_frame(payload: &[u8]) -> Result<(u32, &[u8])> {
    if payload.len() < HEADER_LEN {
        return Err(KafkaError::Deserialization(format!(
            "expected at least {} header bytes, got {}",
            HEADER_LEN,
            payload.len()
        )));
    }
    if payload[0] != MAGIC_BYTE {
        return Err(KafkaError::Deserialization(format!(
            "unknown magic byte {:#04x}",
            payload[0]
        )));
    }
    let schema_id = u32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]);
    Ok((schema_id, &payload[HEADER_LEN..]))
}
