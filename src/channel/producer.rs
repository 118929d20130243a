use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde_json::Value;
use tracing::info;

use super::config::create_client_config;
use super::EnvelopePublisher;
use crate::config::ChannelConfig;
use crate::error::{AppError, AppResult};

/// Publishes envelopes to the channel topic.
///
/// Each publish waits for broker acknowledgement within a bounded delivery
/// timeout; there is no unbounded blocking and no retry beyond the
/// producer's own bounded resend budget. A publish that exhausts its
/// deadline surfaces as an error to the caller.
pub struct ChannelProducer {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl ChannelProducer {
    pub fn new(config: &ChannelConfig) -> Result<Self> {
        let producer: FutureProducer = create_client_config(config)
            .set("acks", "all")
            .set("retries", "3")
            .set("message.timeout.ms", config.send_timeout_ms.to_string())
            .create()
            .context("failed to create channel producer")?;

        info!(topic = %config.topic, "channel producer initialized");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            send_timeout: Duration::from_millis(config.send_timeout_ms),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl EnvelopePublisher for ChannelProducer {
    async fn publish(&self, document: &Value) -> AppResult<()> {
        let payload = serde_json::to_vec(document)?;

        // No partition key: the topic is a single FIFO channel and ordering
        // is whatever the broker connection delivers.
        let record = FutureRecord::<(), Vec<u8>>::to(&self.topic).payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(self.send_timeout))
            .await
        {
            Ok((partition, offset)) => {
                tracing::debug!(partition, offset, "envelope published");
                Ok(())
            }
            Err((err, _)) => {
                tracing::error!(error = %err, topic = %self.topic, "failed to publish envelope");
                Err(AppError::Kafka(err.to_string()))
            }
        }
    }
}
