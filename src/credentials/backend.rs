use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::AppResult;

/// Minimal key-value interface the credential store needs from its cache.
///
/// Every entry carries a TTL; expired entries behave exactly like entries
/// that were never written. Implementations must be safe to share across
/// request tasks.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Upserts `key` with the given TTL, resetting any previous expiry.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Returns the value for `key`, or `None` if absent or expired.
    async fn fetch(&self, key: &str) -> AppResult<Option<String>>;

    /// Verifies the backend is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Redis-backed implementation over an async connection manager.
pub struct RedisBackend {
    conn: redis::aio::ConnectionManager,
}

impl RedisBackend {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        tracing::debug!("opening Redis client");

        let client = redis::Client::open(redis_url)
            .map_err(|e| anyhow::anyhow!("failed to parse Redis URL: {}", e))?;

        tracing::debug!("getting Redis connection manager");
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| anyhow::anyhow!("failed to connect to Redis: {}", e))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        // The connection manager is multiplexed; cloning hands this call
        // its own handle without opening a new connection.
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
