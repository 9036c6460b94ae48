//! Kafka producer returning explicit delivery results.

use crate::error::{KafkaError, Result};
use crate::record::TopicPartitionOffset;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as RdProducer};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, error, info};

/// Configuration for the Kafka producer.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Comma-separated list of Kafka brokers.
    pub brokers: String,

    /// Client identifier reported to the broker.
    pub client_id: String,

    /// How long a send may wait for its delivery report.
    pub delivery_timeout: Duration,
}

impl ProducerConfig {
    /// Creates a new producer configuration.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Comma-separated list of Kafka brokers
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            client_id: "hello-kafka-producer".to_string(),
            delivery_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", &self.client_id)
            .set("message.timeout.ms", self.delivery_timeout.as_millis().to_string());
        config
    }
}

/// Kafka producer.
///
/// Every `send` awaits the broker's delivery report and returns the coordinate the
/// record was written to. Nothing is retried.
pub struct Producer {
    inner: FutureProducer,
    config: ProducerConfig,
}

impl Producer {
    /// Creates a new Kafka producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker list is empty or the producer cannot be created.
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        if config.brokers.trim().is_empty() {
            return Err(KafkaError::Config("broker address must not be empty".into()));
        }
        info!("Creating Kafka producer with brokers: {}", config.brokers);

        let producer: FutureProducer = config.client_config().create()?;

        Ok(Self {
            inner: producer,
            config: config.clone(),
        })
    }

    /// Sends one record and waits for its delivery report.
    ///
    /// # Arguments
    ///
    /// * `topic` - Target topic
    /// * `key` - Optional UTF-8 key; `None` sends a keyless record
    /// * `payload` - Encoded record value
    ///
    /// # Errors
    ///
    /// Returns the broker's delivery failure if the record is rejected or cannot be
    /// confirmed within the delivery timeout.
    pub async fn send(
        &self,
        topic: &str,
        key: Option<&str>,
        payload: &[u8],
    ) -> Result<TopicPartitionOffset> {
        if topic.trim().is_empty() {
            return Err(KafkaError::Config("topic must not be empty".into()));
        }

        debug!(
            "Sending message to topic '{}' with key {:?} ({} bytes)",
            topic,
            key,
            payload.len()
        );

        let mut record = FutureRecord::<str, [u8]>::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.inner.send(record, self.config.delivery_timeout).await {
            Ok((partition, offset)) => {
                debug!(
                    "Message sent successfully to topic '{}' (partition: {}, offset: {})",
                    topic, partition, offset
                );
                Ok(TopicPartitionOffset::new(topic, partition, offset))
            }
            Err((kafka_err, _msg)) => {
                error!("Failed to send message to topic '{}': {}", topic, kafka_err);
                Err(KafkaError::Kafka(kafka_err))
            }
        }
    }

    /// Flushes any pending messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        RdProducer::flush(&self.inner, timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_carries_settings() {
        let config = ProducerConfig::new("broker:9092")
            .with_client_id("demo")
            .with_delivery_timeout(Duration::from_millis(1500));
        let client = config.client_config();
        assert_eq!(client.get("bootstrap.servers"), Some("broker:9092"));
        assert_eq!(client.get("client.id"), Some("demo"));
        assert_eq!(client.get("message.timeout.ms"), Some("1500"));
    }

    #[test]
    fn empty_brokers_are_rejected() {
        let result = Producer::new(&ProducerConfig::new(""));
        assert!(matches!(result, Err(KafkaError::Config(_))));
    }

    #[tokio::test]
    async fn empty_topic_is_rejected_before_sending() {
        let producer = Producer::new(&ProducerConfig::new("localhost:9092")).unwrap();
        let result = producer.send("", None, b"test").await;
        assert!(matches!(result, Err(KafkaError::Config(_))));
    }

    #[tokio::test]
    async fn unreachable_broker_reports_delivery_failure() {
        let config = ProducerConfig::new("127.0.0.1:1")
            .with_delivery_timeout(Duration::from_millis(500));
        let producer = Producer::new(&config).unwrap();
        let result = producer.send("test-topic", None, b"test").await;
        assert!(matches!(result, Err(KafkaError::Kafka(_))));
    }
}
