use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use user_service::application::build_state;
use user_service::config::{Config, StorageBackend};
use user_service::interface::api::{build_router, init_metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting user service");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded: env={}, backend={:?}, listen={}",
        config.env,
        config.database.backend,
        config.listen_address()
    );

    if config.is_production() && config.database.backend == StorageBackend::Memory {
        warn!("Running in production with the in-memory store; data will not survive a restart");
    }

    let state = build_state(&config).await?;

    // Initialize metrics
    let prometheus_handle = init_metrics()?;
    info!("Prometheus metrics initialized");

    let app = build_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("Server is running on http://{}", addr);
    info!("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
