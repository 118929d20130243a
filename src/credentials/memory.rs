use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::backend::KeyValueBackend;
use crate::error::AppResult;

/// In-memory TTL cache for tests and local development.
///
/// Expiry is checked on read against the tokio clock, so tests can drive
/// time with `tokio::time::pause`/`advance` instead of sleeping.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.entries
            .lock()
            .expect("memory backend lock poisoned")
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock().expect("memory backend lock poisoned");
        let expired = match entries.get(key) {
            Some((_, expires_at)) => Instant::now() >= *expires_at,
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_at_the_deadline() {
        let backend = MemoryBackend::new();
        backend.put("k", "v", Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(backend.fetch("k").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(backend.fetch("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.fetch("nope").await.unwrap(), None);
    }
}
