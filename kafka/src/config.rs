//! Command-line and environment configuration for the demo binary.

use crate::consumer::{ConsumerConfig, OffsetReset};
use crate::error::{KafkaError, Result};
use crate::payload::PayloadMode;
use crate::producer::ProducerConfig;
use crate::schema_registry::RegistryConfig;
use clap::Parser;
use kafka_messages::{KafkaMessage, StructuredMessage};
use std::time::Duration;

/// Produce one message to a Kafka topic, then consume the topic until Ctrl+C.
///
/// Every option can also be supplied through the environment variable named in its help.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Comma-separated list of bootstrap brokers.
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    pub brokers: String,

    #[arg(long, env = "KAFKA_TOPIC", default_value = StructuredMessage::TOPIC)]
    pub topic: String,

    #[arg(long, env = "KAFKA_GROUP_ID", default_value = "test-consumer-group")]
    pub group_id: String,

    /// Structured JSON records through the schema registry, or bare UTF-8 text.
    #[arg(long, env = "PAYLOAD_MODE", value_enum, default_value_t = PayloadMode::Structured)]
    pub payload_mode: PayloadMode,

    /// Where a group with no committed offset starts reading.
    #[arg(long, env = "KAFKA_AUTO_OFFSET_RESET", value_enum, default_value_t = OffsetReset::Earliest)]
    pub auto_offset_reset: OffsetReset,

    #[arg(long, env = "KAFKA_AUTO_COMMIT", default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_commit: bool,

    #[arg(long, env = "KAFKA_PRODUCER_CLIENT_ID", default_value = "hello-kafka-producer")]
    pub producer_client_id: String,

    #[arg(long, env = "KAFKA_CONSUMER_CLIENT_ID", default_value = "hello-kafka-consumer")]
    pub consumer_client_id: String,

    /// Key attached to structured messages.
    #[arg(long, env = "KAFKA_MESSAGE_KEY", default_value = "todo")]
    pub message_key: String,

    /// Body sent in plain mode.
    #[arg(long, env = "KAFKA_PLAIN_TEXT", default_value = "test")]
    pub plain_text: String,

    /// Upper bound on a single blocking wait for the next record.
    #[arg(long, env = "KAFKA_POLL_TIMEOUT_MS", default_value_t = 1000)]
    pub poll_timeout_ms: u64,

    #[arg(long, env = "KAFKA_DELIVERY_TIMEOUT_MS", default_value_t = 5000)]
    pub delivery_timeout_ms: u64,

    #[arg(long, env = "SCHEMA_REGISTRY_URL", default_value = "http://localhost:8081")]
    pub schema_registry_url: String,

    #[arg(long, env = "SCHEMA_REGISTRY_MAX_CACHED_SCHEMAS", default_value_t = 1000)]
    pub schema_registry_max_cached_schemas: usize,

    #[arg(long, env = "SCHEMA_REGISTRY_TIMEOUT_MS", default_value_t = 30_000)]
    pub schema_registry_timeout_ms: u64,

    /// Initial capacity of the serializer's output buffer.
    #[arg(long, env = "SERIALIZER_BUFFER_BYTES", default_value_t = 100)]
    pub serializer_buffer_bytes: usize,

    /// Tracing filter directive, e.g. `info` or `kafka=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// Checks the values that the broker and registry clients cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(KafkaError::Config("broker address must not be empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(KafkaError::Config("topic must not be empty".into()));
        }
        if self.group_id.trim().is_empty() {
            return Err(KafkaError::Config("consumer group id must not be empty".into()));
        }
        if self.poll_timeout_ms == 0 {
            return Err(KafkaError::Config("poll timeout must be positive".into()));
        }
        if self.payload_mode == PayloadMode::Structured
            && !(self.schema_registry_url.starts_with("http://")
                || self.schema_registry_url.starts_with("https://"))
        {
            return Err(KafkaError::Config(format!(
                "schema registry url '{}' is not an http(s) url",
                self.schema_registry_url
            )));
        }
        Ok(())
    }

    pub fn producer_config(&self) -> ProducerConfig {
        ProducerConfig::new(&self.brokers)
            .with_client_id(&self.producer_client_id)
            .with_delivery_timeout(Duration::from_millis(self.delivery_timeout_ms))
    }

    pub fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig::new(&self.brokers, &self.group_id)
            .with_client_id(&self.consumer_client_id)
            .with_auto_offset_reset(self.auto_offset_reset)
            .with_auto_commit(self.auto_commit)
            .with_poll_timeout(Duration::from_millis(self.poll_timeout_ms))
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(&self.schema_registry_url)
            .with_max_cached_schemas(self.schema_registry_max_cached_schemas)
            .with_request_timeout(Duration::from_millis(self.schema_registry_timeout_ms))
            .with_buffer_bytes(self.serializer_buffer_bytes)
    }
}
