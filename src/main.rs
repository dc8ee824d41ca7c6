//! Courier message-relay service.
//!
//! Main entry point: initializes tracing, loads configuration, builds
//! the relay engine, and serves the HTTP admission surface until a
//! shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use courier_api::Config;
use courier_delivery::RelayEngine;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting courier message-relay service");

    let config = Config::load()?;
    info!(
        default_url = %config.default_url,
        routes = config.routes.len(),
        max_attempts = config.max_attempts,
        retry_delay_ms = config.retry_delay_ms,
        "Configuration loaded"
    );

    let engine = Arc::new(
        RelayEngine::new(config.to_engine_config()).context("Failed to build relay engine")?,
    );

    let addr = config.parse_server_addr()?;
    info!(addr = %addr, "Courier is ready to receive messages");

    courier_api::start_server(engine, addr, config.request_timeout())
        .await
        .context("Server failed")?;

    info!("Courier shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,courier=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
