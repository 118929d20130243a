use anyhow::{Context, Result};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::Message;
use tracing::info;

use super::config::create_client_config;
use crate::config::ChannelConfig;
use crate::error::{AppError, AppResult};

/// Consumes envelopes from the channel topic.
///
/// Offsets are committed manually: a message counts as delivered only once
/// the worker has finished with it and called [`commit`](Self::commit).
/// If the process dies before committing, the message is redelivered on
/// the next start.
pub struct ChannelConsumer {
    consumer: StreamConsumer,
}

impl ChannelConsumer {
    pub fn new(config: &ChannelConfig) -> Result<Self> {
        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group = %config.consumer_group,
            "initializing channel consumer"
        );

        let consumer: StreamConsumer = create_client_config(config)
            .set("group.id", &config.consumer_group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000")
            .create()
            .context("failed to create channel consumer")?;

        consumer
            .subscribe(&[&config.topic])
            .context("failed to subscribe to channel topic")?;

        info!("channel consumer initialized");

        Ok(Self { consumer })
    }

    /// Waits for the next message and returns its payload bytes.
    pub async fn recv(&self) -> AppResult<Vec<u8>> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| AppError::Kafka(e.to_string()))?;
        Ok(message.payload().unwrap_or_default().to_vec())
    }

    /// Commits the consumer position after successful handling.
    pub fn commit(&self) -> AppResult<()> {
        self.consumer
            .commit_consumer_state(CommitMode::Sync)
            .map_err(|e| AppError::Kafka(e.to_string()))
    }
}
