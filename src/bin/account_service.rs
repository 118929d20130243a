use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datagate::config::Config;
use datagate::context::AccountContext;
use datagate::credentials::{CredentialStore, RedisBackend};
use datagate::routes;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting account service");

    let backend = RedisBackend::connect(&config.redis_url)
        .await
        .context("failed to connect to Redis")?;
    info!("connected to Redis");

    let store = CredentialStore::new(
        Arc::new(backend),
        Duration::from_secs(config.api_key_ttl_secs),
        Duration::from_secs(config.account_ttl_secs),
    );

    let context = Arc::new(AccountContext::new(store));

    let addr = format!("0.0.0.0:{}", config.account_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("account service listening on http://{}", addr);

    axum::serve(listener, routes::account_router(context))
        .await
        .context("account server failed")?;

    Ok(())
}
