//! Kafka consumer with cancellable polling.

use crate::error::{KafkaError, Result};
use crate::record::ConsumedRecord;
use rdkafka::consumer::{Consumer as RdConsumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::ClientConfig;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a consumer group starts reading when it has no committed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OffsetReset {
    Earliest,
    Latest,
}

impl OffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

/// Configuration for the Kafka consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Comma-separated list of Kafka brokers.
    pub brokers: String,

    /// Consumer group ID.
    pub group_id: String,

    /// Client identifier reported to the broker.
    pub client_id: String,

    /// Start position for partitions without a committed offset.
    pub auto_offset_reset: OffsetReset,

    /// Whether offsets are committed automatically in the background.
    pub auto_commit: bool,

    /// Upper bound on a single wait for the next record.
    pub poll_timeout: Duration,

    pub session_timeout: Duration,
}

impl ConsumerConfig {
    /// Creates a new consumer configuration.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Comma-separated list of Kafka brokers
    /// * `group_id` - Consumer group ID
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            client_id: "hello-kafka-consumer".to_string(),
            auto_offset_reset: OffsetReset::Earliest,
            auto_commit: true,
            poll_timeout: Duration::from_secs(1),
            session_timeout: Duration::from_secs(6),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_auto_offset_reset(mut self, reset: OffsetReset) -> Self {
        self.auto_offset_reset = reset;
        self
    }

    pub fn with_auto_commit(mut self, enabled: bool) -> Self {
        self.auto_commit = enabled;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("client.id", &self.client_id)
            .set("auto.offset.reset", self.auto_offset_reset.as_str())
            .set("enable.auto.commit", self.auto_commit.to_string())
            .set("session.timeout.ms", self.session_timeout.as_millis().to_string())
            .set("enable.partition.eof", "false");
        config
    }
}

/// Outcome of one wait for the next record.
#[derive(Debug)]
pub enum Poll {
    /// A record arrived.
    Record(ConsumedRecord),
    /// The client reported an error for this poll; the consumer remains usable.
    Error(KafkaError),
    /// Nothing arrived within the poll timeout.
    Idle,
    /// The cancellation token fired.
    Cancelled,
}

/// Anything the consume loop can poll records from.
pub trait RecordSource {
    /// Waits for the next record, returning promptly once `token` is cancelled.
    fn poll(&self, token: &CancellationToken) -> impl Future<Output = Poll> + Send;

    /// Releases the subscription.
    fn close(&self);
}

/// Kafka consumer subscribed to a single topic.
pub struct Consumer {
    inner: StreamConsumer,
    config: ConsumerConfig,
}

impl Consumer {
    /// Creates a new Kafka consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer cannot be created.
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        if config.brokers.trim().is_empty() {
            return Err(KafkaError::Config("broker address must not be empty".into()));
        }
        info!(
            "Creating Kafka consumer with brokers: {}, group: {}, offset reset: {}",
            config.brokers,
            config.group_id,
            config.auto_offset_reset.as_str()
        );

        let consumer: StreamConsumer = config.client_config().create()?;

        Ok(Self {
            inner: consumer,
            config: config.clone(),
        })
    }

    /// Subscribes to `topic`.
    ///
    /// # Errors
    ///
    /// Returns an error if subscription fails.
    pub fn subscribe(&self, topic: &str) -> Result<()> {
        if topic.trim().is_empty() {
            return Err(KafkaError::Config("topic must not be empty".into()));
        }
        info!("Subscribing to topic: {}", topic);
        self.inner.subscribe(&[topic])?;
        Ok(())
    }
}

impl RecordSource for Consumer {
    async fn poll(&self, token: &CancellationToken) -> Poll {
        if token.is_cancelled() {
            return Poll::Cancelled;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Poll::Cancelled,
            result = tokio::time::timeout(self.config.poll_timeout, self.inner.recv()) => {
                match result {
                    Ok(Ok(message)) => {
                        debug!(
                            "Received message from topic '{}' (partition: {}, offset: {})",
                            message.topic(),
                            message.partition(),
                            message.offset()
                        );
                        Poll::Record(ConsumedRecord::from(&message))
                    }
                    Ok(Err(e)) => Poll::Error(KafkaError::Kafka(e)),
                    Err(_) => Poll::Idle,
                }
            }
        }
    }

    fn close(&self) {
        info!("Closing consumer for group '{}'", self.config.group_id);
        self.inner.unsubscribe();
    }
}
