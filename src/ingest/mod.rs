// ============================================================================
// Ingestion Worker
// ============================================================================
//
// Long-running consumer draining the message channel. Messages are handled
// strictly sequentially, preserving the channel's delivery order:
//
// 1. decode the payload into a JSON object
// 2. hand the document to the processor
// 3. commit the offset once the message is finished
//
// A payload that does not decode can never succeed, so it is logged and
// committed (skipped). A processing failure leaves the offset uncommitted
// and the message is redelivered after a restart. A broker failure is
// fatal; there is no reconnect.
//
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::channel::ChannelConsumer;
use crate::error::AppResult;

/// Processing step applied to each decoded document.
///
/// The default implementation only enumerates the document; persisting it
/// into a document store is left to future implementations of this trait.
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    async fn process(&self, document: &Map<String, Value>) -> AppResult<()>;
}

/// Placeholder processor that logs every key/value pair it receives.
pub struct LogProcessor;

#[async_trait]
impl DocumentProcessor for LogProcessor {
    async fn process(&self, document: &Map<String, Value>) -> AppResult<()> {
        for (key, value) in document {
            info!(%key, %value, "ingested field");
        }
        Ok(())
    }
}

/// What became of a single payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOutcome {
    /// Decoded and processed; the offset may be committed.
    Processed,
    /// Undecodable; logged and committed so it is not redelivered.
    Skipped,
    /// Decoded but processing failed; left uncommitted for redelivery.
    Failed,
}

/// Decodes a payload into a generic key/value document.
pub fn decode_document(payload: &[u8]) -> AppResult<Map<String, Value>> {
    Ok(serde_json::from_slice(payload)?)
}

/// Handles one payload: decode, process, classify the outcome. Failures
/// never escape; per-message isolation is the point.
pub async fn handle_payload(processor: &dyn DocumentProcessor, payload: &[u8]) -> PayloadOutcome {
    let document = match decode_document(payload) {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(error = %err, "failed to decode message, skipping");
            return PayloadOutcome::Skipped;
        }
    };

    match processor.process(&document).await {
        Ok(()) => PayloadOutcome::Processed,
        Err(err) => {
            tracing::error!(error = %err, "failed to process document");
            PayloadOutcome::Failed
        }
    }
}

/// Sequential receive loop over the message channel.
pub struct IngestWorker {
    consumer: ChannelConsumer,
    processor: Arc<dyn DocumentProcessor>,
}

impl IngestWorker {
    pub fn new(consumer: ChannelConsumer, processor: Arc<dyn DocumentProcessor>) -> Self {
        Self {
            consumer,
            processor,
        }
    }

    /// Runs for the lifetime of the process. Returns only on a broker
    /// failure, which terminates the worker.
    pub async fn run(&self) -> AppResult<()> {
        info!("ingest worker consuming");

        loop {
            let payload = self.consumer.recv().await?;

            match handle_payload(self.processor.as_ref(), &payload).await {
                PayloadOutcome::Processed | PayloadOutcome::Skipped => self.consumer.commit()?,
                PayloadOutcome::Failed => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProcessor {
        seen: Mutex<Vec<Map<String, Value>>>,
    }

    #[async_trait]
    impl DocumentProcessor for RecordingProcessor {
        async fn process(&self, document: &Map<String, Value>) -> AppResult<()> {
            self.seen.lock().unwrap().push(document.clone());
            Ok(())
        }
    }

    struct FailingProcessor;

    #[async_trait]
    impl DocumentProcessor for FailingProcessor {
        async fn process(&self, _document: &Map<String, Value>) -> AppResult<()> {
            Err(AppError::downstream("storage unavailable"))
        }
    }

    #[test]
    fn decode_accepts_objects_and_rejects_everything_else() {
        assert!(decode_document(br#"{"a":1}"#).is_ok());
        assert!(decode_document(b"not-json").is_err());
        assert!(decode_document(b"[1,2]").is_err());
        assert!(decode_document(b"").is_err());
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped_and_the_next_one_decodes() {
        let processor = RecordingProcessor::default();

        let outcome = handle_payload(&processor, b"not-json").await;
        assert_eq!(outcome, PayloadOutcome::Skipped);

        let outcome = handle_payload(&processor, br#"{"b":2}"#).await;
        assert_eq!(outcome, PayloadOutcome::Processed);

        let seen = processor.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(Value::Object(seen[0].clone()), json!({"b":2}));
    }

    #[tokio::test]
    async fn processing_failure_is_isolated() {
        let outcome = handle_payload(&FailingProcessor, br#"{"a":1}"#).await;
        assert_eq!(outcome, PayloadOutcome::Failed);
    }
}
