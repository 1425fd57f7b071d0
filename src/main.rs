mod config;
mod constants;
mod error;
mod formatters;
mod models;
mod normalizer;
mod service;

use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::service::Forecast;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cwa_forecast_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting MCP forecast server");

    let config = Config::from_env()?;
    tracing::info!(
        "Using dataset {} (default location: {})",
        config.dataset,
        config.default_location.as_deref().unwrap_or("first published")
    );

    let forecast = Forecast::new(config)?;
    let server = forecast.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
