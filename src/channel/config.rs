use rdkafka::config::ClientConfig;

use crate::config::ChannelConfig;

/// Builds the shared broker client configuration, so the producer and the
/// consumer connect consistently.
pub(crate) fn create_client_config(config: &ChannelConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config.set("bootstrap.servers", &config.brokers);
    client_config
}
