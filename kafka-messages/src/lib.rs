//! Message types exchanged over Kafka by the hello-kafka demo.
//!
//! This crate provides the `KafkaMessage` trait, which associates a message type
//! with its Kafka topic, and the `StructuredMessage` record sent by the demo.

use serde::{Deserialize, Serialize};

mod structured;

pub use structured::StructuredMessage;

/// Trait for types that can be sent as Kafka messages.
///
/// Implementors must specify the Kafka topic where messages of this type should be sent.
/// The trait also requires `Serialize` and `Deserialize` for JSON encoding/decoding.
///
/// # Example
///
/// ```
/// use kafka_messages::KafkaMessage;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Greeting {
///     text: String,
/// }
///
/// impl KafkaMessage for Greeting {
///     const TOPIC: &'static str = "greetings";
/// }
/// ```
pub trait KafkaMessage: Serialize + for<'de> Deserialize<'de> + Send + Sync {
    /// The Kafka topic where messages of this type should be sent.
    const TOPIC: &'static str;

    /// JSON-Schema document describing the serialized form, used when registering
    /// the type with a schema registry.
    fn json_schema() -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
}
