// ============================================================================
// Credential Store
// ============================================================================
//
// Authoritative holder of ephemeral API keys and account records over a
// TTL-capable key-value cache. Nothing here is durable:
//
// 1. API keys     -> expire 5 minutes after (re-)issuance
// 2. Accounts     -> expire 1 minute after the last write
//
// An expired entry is indistinguishable from one that was never written,
// so "invalid key" and "unknown key" are the same observable outcome.
//
// ============================================================================

mod backend;
mod memory;

pub use backend::{KeyValueBackend, RedisBackend};
pub use memory::MemoryBackend;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// Cache key prefixes keep API keys and account ids from colliding in the
// shared keyspace.
const API_KEY_PREFIX: &str = "apikey:";
const ACCOUNT_PREFIX: &str = "account:";

// API keys carry no payload; existence within the TTL is the whole record.
const API_KEY_MARKER: &str = "1";

/// Cached account record. Value semantics only; expiry makes this a
/// session-cache entry rather than a durable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Credential store over a pluggable TTL cache backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueBackend>,
    api_key_ttl: Duration,
    account_ttl: Duration,
}

impl CredentialStore {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        api_key_ttl: Duration,
        account_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            api_key_ttl,
            account_ttl,
        }
    }

    /// Upserts an API key with the full TTL. Repeated calls reset the
    /// expiry rather than stacking it.
    pub async fn add_api_key(&self, api_key: &str) -> AppResult<()> {
        if api_key.is_empty() {
            return Err(AppError::validation("API key must not be empty"));
        }
        self.backend
            .put(
                &format!("{API_KEY_PREFIX}{api_key}"),
                API_KEY_MARKER,
                self.api_key_ttl,
            )
            .await?;
        tracing::debug!(ttl_secs = self.api_key_ttl.as_secs(), "stored API key");
        Ok(())
    }

    /// Returns `true` iff the key exists and is unexpired. Absent and
    /// expired keys are `false`, never an error; only transport failures
    /// propagate.
    pub async fn check_api_key(&self, api_key: &str) -> AppResult<bool> {
        let value = self
            .backend
            .fetch(&format!("{API_KEY_PREFIX}{api_key}"))
            .await?;
        Ok(value.is_some())
    }

    /// Upserts an account record with the full TTL.
    pub async fn add_account(&self, id: &str, name: &str) -> AppResult<()> {
        if id.is_empty() {
            return Err(AppError::validation("account id must not be empty"));
        }
        self.backend
            .put(&format!("{ACCOUNT_PREFIX}{id}"), name, self.account_ttl)
            .await?;
        tracing::debug!(account_id = %id, ttl_secs = self.account_ttl.as_secs(), "stored account");
        Ok(())
    }

    /// Returns the most recently written record for `id`, or `NotFound`
    /// once the TTL has elapsed or if it was never written.
    pub async fn get_account(&self, id: &str) -> AppResult<Account> {
        match self.backend.fetch(&format!("{ACCOUNT_PREFIX}{id}")).await? {
            Some(name) => Ok(Account {
                id: id.to_string(),
                name,
            }),
            None => Err(AppError::not_found(format!("no account for id '{id}'"))),
        }
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.backend.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(
            Arc::new(MemoryBackend::new()),
            Duration::from_secs(300),
            Duration::from_secs(60),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn api_key_is_valid_until_ttl_elapses() {
        let store = store();
        store.add_api_key("k1").await.unwrap();
        assert!(store.check_api_key("k1").await.unwrap());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(store.check_api_key("k1").await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!store.check_api_key("k1").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_key_is_false_not_an_error() {
        let store = store();
        assert!(!store.check_api_key("never-added").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn readding_a_key_resets_the_ttl() {
        let store = store();
        store.add_api_key("k1").await.unwrap();

        tokio::time::advance(Duration::from_secs(200)).await;
        store.add_api_key("k1").await.unwrap();

        // 400s after the first add: expired unless the second add reset
        // the clock to the full duration.
        tokio::time::advance(Duration::from_secs(200)).await;
        assert!(store.check_api_key("k1").await.unwrap());

        tokio::time::advance(Duration::from_secs(101)).await;
        assert!(!store.check_api_key("k1").await.unwrap());
    }

    #[tokio::test]
    async fn empty_api_key_is_rejected() {
        let store = store();
        let err = store.add_api_key("").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn account_round_trip_and_expiry() {
        let store = store();
        store.add_account("42", "alice").await.unwrap();

        let account = store.get_account("42").await.unwrap();
        assert_eq!(
            account,
            Account {
                id: "42".to_string(),
                name: "alice".to_string(),
            }
        );

        tokio::time::advance(Duration::from_secs(61)).await;
        let err = store.get_account("42").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn account_overwrite_returns_latest_name() {
        let store = store();
        store.add_account("42", "alice").await.unwrap();
        store.add_account("42", "bob").await.unwrap();
        assert_eq!(store.get_account("42").await.unwrap().name, "bob");
    }

    #[tokio::test]
    async fn empty_account_id_is_rejected() {
        let store = store();
        let err = store.add_account("", "alice").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
