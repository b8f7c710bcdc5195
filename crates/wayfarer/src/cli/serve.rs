//! Serve command handler.

use std::net::SocketAddr;
use std::sync::Arc;
use wayfarer::{serve, ApiState, ValidationError, WayfarerConfig, WayfarerResult};

/// Handle the `serve` command.
pub async fn handle_serve_command(config: &WayfarerConfig, bind: Option<String>) -> WayfarerResult<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| ValidationError::new(format!("Invalid bind address '{}': {}", bind, e)))?;

    let orchestrator = Arc::new(config.build_orchestrator()?);
    tracing::info!("Migration API starting. Press Ctrl+C to stop.");
    serve(addr, ApiState::new(orchestrator)).await
}
