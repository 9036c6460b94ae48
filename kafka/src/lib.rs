//! Kafka demo client: produce one record, then consume the topic until interrupted.
//!
//! This crate is built on top of `rdkafka` and `tokio`.
//!
//! # Features
//!
//! - Producer returning explicit delivery coordinates
//! - Consumer with cancellable polling (`CancellationToken`) and an earliest-offset default
//! - Two payload strategies: schema-registry framed JSON (`StructuredMessage`) or plain text
//! - Caching schema registry client
//! - Integrated tracing
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use kafka::{app, AppConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::parse();
//!     let token = CancellationToken::new();
//!     app::run(&config, &token, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
mod config;
mod consumer;
mod error;
mod json_serde;
mod payload;
mod producer;
mod record;
mod schema_registry;

pub use config::AppConfig;
pub use consumer::{Consumer, ConsumerConfig, OffsetReset, Poll, RecordSource};
pub use error::{KafkaError, Result};
pub use json_serde::{split_frame, value_subject, JsonDeserializer, JsonSerializer};
pub use payload::{EncodedRecord, PayloadMode, PayloadStrategy};
pub use producer::{Producer, ProducerConfig};
pub use record::{ConsumedRecord, TopicPartitionOffset};
pub use schema_registry::{RegistryConfig, SchemaRegistryClient};

/// Re-export the message types for convenience
pub use kafka_messages::{KafkaMessage, StructuredMessage};
