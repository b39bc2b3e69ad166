use std::sync::Arc;

use anyhow::Context;
use workmind_chat::cli::ConsoleRenderer;
use workmind_chat::config::ChatConfig;
use workmind_chat::controller::ChatController;
use workmind_chat::gateway::WorkmindClient;
use workmind_chat::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ChatConfig::from_env().context("Invalid configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = logging::init_logging(&config.logging)?;

    tracing::info!("=== Workmind Chat Starting ===");
    tracing::info!("Gateway: {}", config.gateway.base_url);

    let client = Arc::new(WorkmindClient::new(config.gateway.clone())?);
    let controller = ChatController::new(client);

    let mut renderer = ConsoleRenderer::new(controller, config.gateway.agent_id.clone());
    renderer.run().await?;

    tracing::info!("=== Workmind Chat Shutting Down ===");

    Ok(())
}
