//! # SP Server
//!
//! Main entry point for the Service Provider server.

#![forbid(unsafe_code)]

use sp_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        sp = %config.saml.sp.entity_id,
        idp = %config.saml.idp.entity_id,
        "SP server starting..."
    );

    Server::new(config).run().await
}
