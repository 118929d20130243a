use anyhow::{Context, Result};

use crate::gateway::AdmissionPolicy;

// ============================================================================
// Configuration Constants
// ============================================================================

// Default port values
const DEFAULT_GATEWAY_PORT: u16 = 8000;
const DEFAULT_ACCOUNT_PORT: u16 = 8002;

// Default TTL values (in seconds)
// API keys live for five minutes; account records are a short-lived cache
// with a one-minute TTL, not a durable identity store.
const DEFAULT_API_KEY_TTL_SECS: u64 = 300;
const DEFAULT_ACCOUNT_TTL_SECS: u64 = 60;

// Default channel settings
const DEFAULT_CHANNEL_TOPIC: &str = "data";
const DEFAULT_CONSUMER_GROUP: &str = "ingest-workers";
const DEFAULT_SEND_TIMEOUT_MS: u64 = 2000;

// Default upstream call settings (gateway -> account service)
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 2000;
const DEFAULT_UPSTREAM_MAX_RETRIES: u32 = 2;
const DEFAULT_UPSTREAM_RETRY_BASE_MS: u64 = 100;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Message channel (broker) configuration
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Comma-separated list of broker addresses
    pub brokers: String,
    /// Topic name carrying ingestion envelopes
    pub topic: String,
    /// Consumer group ID for ingest workers
    pub consumer_group: String,
    /// Bounded delivery timeout for a single publish (milliseconds)
    pub send_timeout_ms: u64,
}

/// Deadline and retry policy for the gateway's upstream HTTP calls
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_ms: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub redis_url: String,
    pub account_service_url: String,
    pub gateway_port: u16,
    pub account_port: u16,
    pub api_key_ttl_secs: u64,
    pub account_ttl_secs: u64,
    pub admission_policy: AdmissionPolicy,
    pub channel: ChannelConfig,
    pub upstream: UpstreamConfig,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").context("REDIS_URL must be set")?,
            account_service_url: std::env::var("ACCOUNT_SERVICE_URL")
                .context("ACCOUNT_SERVICE_URL must be set")?,
            gateway_port: std::env::var("GATEWAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_GATEWAY_PORT),
            account_port: std::env::var("ACCOUNT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_ACCOUNT_PORT),
            api_key_ttl_secs: std::env::var("API_KEY_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_API_KEY_TTL_SECS),
            account_ttl_secs: std::env::var("ACCOUNT_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ACCOUNT_TTL_SECS),
            admission_policy: match std::env::var("ADMISSION_POLICY") {
                Ok(value) => value.parse()?,
                Err(_) => AdmissionPolicy::FailClosed,
            },
            channel: ChannelConfig {
                brokers: std::env::var("KAFKA_BROKERS").context("KAFKA_BROKERS must be set")?,
                topic: std::env::var("KAFKA_TOPIC")
                    .unwrap_or_else(|_| DEFAULT_CHANNEL_TOPIC.to_string()),
                consumer_group: std::env::var("KAFKA_CONSUMER_GROUP")
                    .unwrap_or_else(|_| DEFAULT_CONSUMER_GROUP.to_string()),
                send_timeout_ms: std::env::var("CHANNEL_SEND_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SEND_TIMEOUT_MS),
            },
            upstream: UpstreamConfig {
                timeout_ms: std::env::var("UPSTREAM_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_MS),
                max_retries: std::env::var("UPSTREAM_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_MAX_RETRIES),
                retry_base_ms: std::env::var("UPSTREAM_RETRY_BASE_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_RETRY_BASE_MS),
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
