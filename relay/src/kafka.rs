use std::time::Duration;

use chrono::Utc;
use frame_gate_common::config::KafkaConfig;
use frame_gate_common::frame::TimestampedFrame;
use frame_gate_detector::{FrameSink, FrameSource};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum KafkaSetupError {
    #[error("failed to create Kafka consumer: {0}")]
    ConsumerCreate(KafkaError),
    #[error("failed to subscribe to {topic}: {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: KafkaError,
    },
    #[error("failed to create Kafka producer: {0}")]
    ProducerCreate(KafkaError),
}

#[derive(Debug, thiserror::Error)]
#[error("Kafka delivery failed: {0}")]
pub struct PublishError(KafkaError);

const MIN_ERROR_BACKOFF: Duration = Duration::from_millis(100);
const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Delay between consecutive consume errors, doubling up to a cap.
#[derive(Debug)]
struct ErrorBackoff {
    next: Duration,
}

impl ErrorBackoff {
    fn new() -> Self {
        Self {
            next: MIN_ERROR_BACKOFF,
        }
    }

    /// Delay to wait now; the following call returns twice as much.
    fn step(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(MAX_ERROR_BACKOFF);
        delay
    }

    fn reset(&mut self) {
        self.next = MIN_ERROR_BACKOFF;
    }
}

/// Input topic subscription. Yields frames in partition order.
pub struct KafkaSource {
    consumer: StreamConsumer,
    backoff: ErrorBackoff,
}

impl KafkaSource {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaSetupError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "1000")
            .set("max.partition.fetch.bytes", "10485760")
            .create()
            .map_err(KafkaSetupError::ConsumerCreate)?;

        consumer
            .subscribe(&[&config.input_topic])
            .map_err(|source| KafkaSetupError::Subscribe {
                topic: config.input_topic.clone(),
                source,
            })?;

        Ok(Self {
            consumer,
            backoff: ErrorBackoff::new(),
        })
    }
}

impl FrameSource for KafkaSource {
    /// Never returns `None`; consume errors and malformed messages are skipped.
    async fn next_frame(&mut self) -> Option<TimestampedFrame> {
        loop {
            let msg = match self.consumer.recv().await {
                Ok(m) => {
                    self.backoff.reset();
                    m
                }
                Err(e) => {
                    let delay = self.backoff.step();
                    warn!(error = %e, "Kafka consume error, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            let Some(payload) = msg.payload() else {
                debug!("empty Kafka message, skipping");
                continue;
            };

            match TimestampedFrame::deserialize(payload) {
                Ok(frame) => {
                    debug!(
                        seq = frame.seq,
                        bytes = frame.image.len(),
                        age_ms = frame.age_ms(Utc::now()),
                        "frame received"
                    );
                    return Some(frame);
                }
                Err(e) => {
                    warn!(error = %e, offset = msg.offset(), "failed to deserialize frame, skipping");
                }
            }
        }
    }
}

/// Output topic publisher.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaSetupError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.max.bytes", "10485760")
            .set("compression.type", &config.compression)
            .set("linger.ms", "5")
            .set("queue.buffering.max.messages", "1000")
            .set("request.timeout.ms", "5000")
            .create()
            .map_err(KafkaSetupError::ProducerCreate)?;

        Ok(Self {
            producer,
            topic: config.output_topic.clone(),
        })
    }
}

impl FrameSink for KafkaSink {
    type Error = PublishError;

    async fn publish(&mut self, frame: &TimestampedFrame) -> Result<(), Self::Error> {
        let payload = frame.serialize();
        let key = frame.seq.to_string();
        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map(|_| ())
            .map_err(|(e, _)| PublishError(e))
    }

    fn name(&self) -> &str {
        &self.topic
    }
}
