use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

use super::retry::with_retry;
use super::KeyDecision;
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// Seam between the gateway and the credential store.
#[async_trait]
pub trait CredentialChecker: Send + Sync {
    async fn check_api_key(&self, api_key: &str) -> KeyDecision;
}

/// HTTP client for the account service's credential check endpoint.
///
/// Every call carries a bounded deadline; transient failures are retried
/// with exponential backoff. A check that still fails after the retry
/// budget is reported as [`KeyDecision::Indeterminate`], never as an error
/// to the request handler.
pub struct CredentialClient {
    http: reqwest::Client,
    base_url: String,
    upstream: UpstreamConfig,
}

impl CredentialClient {
    pub fn new(base_url: &str, upstream: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(upstream.timeout_ms))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            upstream: upstream.clone(),
        })
    }

    async fn check_once(&self, api_key: &str) -> AppResult<KeyDecision> {
        let response = self
            .http
            .get(format!("{}/checkAPIKey", self.base_url))
            .query(&[("apiKey", api_key)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(KeyDecision::Allowed),
            StatusCode::NOT_FOUND => Ok(KeyDecision::Denied),
            status => Err(AppError::downstream(format!(
                "credential service returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl CredentialChecker for CredentialClient {
    async fn check_api_key(&self, api_key: &str) -> KeyDecision {
        match with_retry(&self.upstream, "check-api-key", || self.check_once(api_key)).await {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(error = %err, "credential check inconclusive");
                KeyDecision::Indeterminate
            }
        }
    }
}
