use anyhow::Result;
use hireflow::{start_web_server, AppConfig};
use std::fs::OpenOptions;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open("/tmp/hireflow.log")
        .expect("Failed to open log file");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hireflow=info,rocket::server=off")),
        )
        .init();

    let port = std::env::var("ROCKET_PORT")
        .map_err(|_| anyhow::anyhow!("ROCKET_PORT environment variable not set"))?
        .parse::<u16>()
        .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;

    let config = AppConfig::load()?;
    config.ensure_directories().await?;

    info!("Starting hireflow recruitment API server");
    info!(
        "Environment: {}",
        std::env::var("HIREFLOW_ENV").unwrap_or_else(|_| "local".to_string())
    );
    info!("Database: {}", config.database_path.display());
    info!("Upstream: {}", config.upstream.base_url);
    info!("Server: http://0.0.0.0:{}", port);

    start_web_server(config, port).await
}
