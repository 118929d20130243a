// ============================================================================
// Message Channel
// ============================================================================
//
// Thin publish/consume wrapper over one durable broker topic. The channel
// is the only shared state between the synchronous edge and the async
// ingest half of the pipeline: the gateway publishes envelopes, the worker
// drains them.
//
// Envelopes are UTF-8 JSON documents of unconstrained shape; the channel
// treats them as opaque bytes. Offsets are committed manually by the
// consumer after processing, so delivery is at-least-once.
//
// ============================================================================

mod config;
mod consumer;
mod producer;

pub use consumer::ChannelConsumer;
pub use producer::ChannelProducer;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

/// Seam between the gateway and the broker: anything that can carry an
/// envelope into the channel.
#[async_trait]
pub trait EnvelopePublisher: Send + Sync {
    async fn publish(&self, document: &Value) -> AppResult<()>;
}
