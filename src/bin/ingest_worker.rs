use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datagate::channel::ChannelConsumer;
use datagate::config::Config;
use datagate::ingest::{IngestWorker, LogProcessor};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting ingest worker");

    let consumer =
        ChannelConsumer::new(&config.channel).context("failed to connect to message channel")?;
    info!("connected to message channel");

    let worker = IngestWorker::new(consumer, Arc::new(LogProcessor));

    // The loop only returns on a broker failure; that failure is fatal and
    // terminates the process.
    worker.run().await.context("ingest worker terminated")?;

    Ok(())
}
