pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Gateway service module
pub mod utils;

pub use error::{AppError, AppResult};

use modules::logger;
use std::sync::Arc;
use tracing::{error, info};

/// Run the gateway until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    logger::init_logger();

    let config = modules::config::load_app_config().map_err(anyhow::Error::msg)?;
    info!("Configuration loaded: {:?}", config);

    let (server, handle) = proxy::AxumServer::start(Arc::new(config))
        .await
        .map_err(anyhow::Error::msg)?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down");
    server.stop();
    handle.await?;
    Ok(())
}
