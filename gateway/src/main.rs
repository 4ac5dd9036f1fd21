mod api;
mod config;
mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use benchop_core::{Dispatcher, ToolConfig};

use crate::config::GatewayConfig;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging Setup
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("BENCHOP Gateway Initializing...");

    // 2. Load Configuration (.env first, then the process environment)
    let tool = ToolConfig::from_env().context("Invalid tool configuration")?;
    let gateway = GatewayConfig::from_env().context("Invalid gateway configuration")?;
    info!(
        "Tool: '{}' with script '{}' (timeout: {})",
        tool.tool,
        tool.script,
        tool.timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );

    // 3. Build the Dispatcher
    let state = AppState {
        dispatcher: Arc::new(Dispatcher::from_config(&tool)),
        strict_status: gateway.strict_status,
    };

    // 4. Define Routes
    let app = router(state);

    // 5. Start Server
    let listener = TcpListener::bind(gateway.addr)
        .await
        .with_context(|| format!("Failed to bind {}", gateway.addr))?;
    info!("Gateway listening on {}...", gateway.addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
