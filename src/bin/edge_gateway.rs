use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datagate::channel::ChannelProducer;
use datagate::config::Config;
use datagate::context::GatewayContext;
use datagate::gateway::CredentialClient;
use datagate::routes;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting edge gateway");

    let credentials = CredentialClient::new(&config.account_service_url, &config.upstream)
        .context("failed to create credential client")?;

    let publisher =
        ChannelProducer::new(&config.channel).context("failed to connect to message channel")?;
    info!("connected to message channel");

    let context = Arc::new(GatewayContext::new(
        Arc::new(credentials),
        Arc::new(publisher),
        config.admission_policy,
    ));

    let addr = format!("0.0.0.0:{}", config.gateway_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("edge gateway listening on http://{}", addr);

    axum::serve(listener, routes::gateway_router(context))
        .await
        .context("gateway server failed")?;

    Ok(())
}
