//! Record coordinates and owned copies of consumed records.

use rdkafka::message::{BorrowedMessage, Message};
use std::fmt;

/// Position of a record in the broker's log.
///
/// Displays as `topic [[partition]] @offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPartitionOffset {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl TopicPartitionOffset {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
        }
    }
}

impl fmt::Display for TopicPartitionOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [[{}]] @{}", self.topic, self.partition, self.offset)
    }
}

/// A consumed record detached from the consumer's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedRecord {
    pub coordinate: TopicPartitionOffset,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
}

impl<'a> From<&BorrowedMessage<'a>> for ConsumedRecord {
    fn from(message: &BorrowedMessage<'a>) -> Self {
        Self {
            coordinate: TopicPartitionOffset::new(
                message.topic(),
                message.partition(),
                message.offset(),
            ),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec),
        }
    }
}
