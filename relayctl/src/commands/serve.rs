//! Serve command implementation

use crate::config::RelayctlConfig;
use crate::error::CliError;
use promptrelay_connector_gemini::GeminiConnector;
use promptrelay_core::prelude::*;
use promptrelay_http::RelayServer;
use std::sync::Arc;
use tracing::{error, info};

/// Handle serve command
pub async fn handle_serve_command(config: RelayctlConfig) -> Result<(), CliError> {
    let (server_config, gemini_config) = config.into_parts();

    let generator: Arc<dyn ContentGenerator> = Arc::new(GeminiConnector::new(gemini_config)?);
    let server = Arc::new(RelayServer::new(server_config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            if let Err(e) = signal_server.stop().await {
                error!("Failed to stop relay: {}", e);
            }
        }
    });

    server.start(generator).await?;
    Ok(())
}
