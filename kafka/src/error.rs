//! Error types for the hello-kafka library.

use thiserror::Error;

/// Result type alias for Kafka operations.
pub type Result<T> = std::result::Result<T, KafkaError>;

/// Errors that can occur during Kafka operations.
#[derive(Error, Debug)]
pub enum KafkaError {
    /// Error from the underlying rdkafka library (delivery failures, consume errors).
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Error serializing a message payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error deserializing a message payload.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Error talking to the schema registry.
    #[error("Schema registry error: {0}")]
    SchemaRegistry(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for KafkaError {
    fn from(e: reqwest::Error) -> Self {
        KafkaError::SchemaRegistry(e.to_string())
    }
}

impl KafkaError {
    /// Human-readable reason, without the category prefix, for console reports.
    pub fn reason(&self) -> String {
        match self {
            KafkaError::Kafka(e) => e.to_string(),
            KafkaError::Serialization(msg)
            | KafkaError::Deserialization(msg)
            | KafkaError::SchemaRegistry(msg)
            | KafkaError::Config(msg)
            | KafkaError::Other(msg) => msg.clone(),
        }
    }
}
