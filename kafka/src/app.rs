//! The demo flow: produce one record, then consume the topic until cancelled.

use crate::config::AppConfig;
use crate::consumer::{Consumer, Poll, RecordSource};
use crate::error::Result;
use crate::json_serde::JsonSerializer;
use crate::payload::{PayloadMode, PayloadStrategy};
use crate::producer::Producer;
use crate::record::TopicPartitionOffset;
use crate::schema_registry::SchemaRegistryClient;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Counts of what the consume loop reported before it stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeSummary {
    pub records: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Polling,
    Stopped,
}

/// Builds the payload strategy selected by `config`.
///
/// Structured mode creates the schema registry client; no request is made until the
/// first record is encoded.
pub fn build_strategy(config: &AppConfig) -> Result<PayloadStrategy> {
    match config.payload_mode {
        PayloadMode::Structured => {
            let registry_config = config.registry_config();
            let registry = Arc::new(SchemaRegistryClient::new(&registry_config)?);
            let serializer = JsonSerializer::new(registry, registry_config.buffer_bytes);
            Ok(PayloadStrategy::structured(serializer, &config.message_key))
        }
        PayloadMode::Plain => Ok(PayloadStrategy::plain(&config.plain_text)),
    }
}

/// Produces the demo record and reports the outcome to `out`.
///
/// Failures are reported and swallowed; the coordinate is returned on success.
pub async fn produce<W: Write>(
    config: &AppConfig,
    strategy: &PayloadStrategy,
    out: &mut W,
) -> Option<TopicPartitionOffset> {
    let producer = match Producer::new(&config.producer_config()) {
        Ok(producer) => producer,
        Err(e) => {
            report(out, &format!("Delivery failed: {}", e.reason()));
            return None;
        }
    };

    let outcome = match strategy.encode_demo(&config.topic).await {
        Ok(record) => producer
            .send(&config.topic, record.key.as_deref(), &record.value)
            .await
            .map(|coordinate| (record.display, coordinate)),
        Err(e) => Err(e),
    };

    let delivered = match outcome {
        Ok((display, coordinate)) => {
            report(out, &format!("Delivered '{}' to '{}'", display, coordinate));
            Some(coordinate)
        }
        Err(e) => {
            report(out, &format!("Delivery failed: {}", e.reason()));
            None
        }
    };

    if let Err(e) = producer.flush(Duration::from_millis(config.delivery_timeout_ms)) {
        warn!("Failed to flush producer: {}", e);
    }
    delivered
}

/// Subscribes to the configured topic and reports records until `token` is cancelled.
///
/// # Errors
///
/// Returns an error only if the consumer cannot be created or subscribed.
pub async fn consume<W: Write>(
    config: &AppConfig,
    strategy: &PayloadStrategy,
    token: &CancellationToken,
    out: &mut W,
) -> Result<ConsumeSummary> {
    let consumer = Consumer::new(&config.consumer_config())?;
    consumer.subscribe(&config.topic)?;
    Ok(consume_loop(&consumer, strategy, token, out).await)
}

/// Polls `source` until cancellation, reporting each record or per-record error.
///
/// Errors never stop the loop. The source is closed before returning.
pub async fn consume_loop<S: RecordSource, W: Write>(
    source: &S,
    strategy: &PayloadStrategy,
    token: &CancellationToken,
    out: &mut W,
) -> ConsumeSummary {
    let mut summary = ConsumeSummary::default();
    let mut state = LoopState::Polling;

    info!("Starting consumer loop");
    while state == LoopState::Polling {
        match source.poll(token).await {
            Poll::Record(record) => match strategy.decode(record.payload.as_deref()) {
                Ok(body) => {
                    summary.records += 1;
                    report(
                        out,
                        &format!("Consumed message '{}' at: '{}'", body, record.coordinate),
                    );
                }
                Err(e) => {
                    summary.errors += 1;
                    report(out, &format!("Error occurred: {}", e.reason()));
                }
            },
            Poll::Error(e) => {
                summary.errors += 1;
                report(out, &format!("Error occurred: {}", e.reason()));
            }
            Poll::Idle => {}
            Poll::Cancelled => state = LoopState::Stopped,
        }
    }

    source.close();
    info!(
        "Consumer stopped after {} records and {} errors",
        summary.records, summary.errors
    );
    summary
}

/// Runs the whole demo: produce once, then consume until `token` is cancelled.
pub async fn run<W: Write>(
    config: &AppConfig,
    token: &CancellationToken,
    out: &mut W,
) -> Result<ConsumeSummary> {
    config.validate()?;
    let strategy = build_strategy(config)?;
    info!(
        "Running in {} mode against {} (topic '{}')",
        strategy.mode(),
        config.brokers,
        config.topic
    );

    produce(config, &strategy, out).await;
    consume(config, &strategy, token, out).await
}

fn report<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        warn!("Failed to write report line: {}", e);
    }
}
