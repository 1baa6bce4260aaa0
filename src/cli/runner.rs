//! Server run loop with graceful shutdown.

use anyhow::{Context, Result};

use super::bootstrap::AppContext;
use crate::server::{start_server, AppState};

/// Reason given to callers still waiting when the process stops.
const SHUTDOWN_REASON: &str = "server shutting down";

/// Serve until Ctrl-C.
///
/// On shutdown, pending approvals are cancelled first so blocked hook calls
/// get a failure payload before the HTTP server drains.
pub async fn run(ctx: AppContext) -> Result<()> {
    let (state, _) = AppState::new(ctx.orchestrator.clone());
    let (addr, shutdown) = start_server(&ctx.host, ctx.port, state)
        .await
        .with_context(|| format!("Failed to bind {}:{}", ctx.host, ctx.port))?;

    tracing::info!("askgate listening on http://{}", addr);

    let poller = ctx
        .poller
        .map(|poller| tokio::spawn(poller.run(shutdown.child_token())));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    ctx.orchestrator.shutdown(SHUTDOWN_REASON);
    shutdown.cancel();

    if let Some(handle) = poller {
        if let Err(e) = handle.await {
            tracing::warn!("Telegram poller task failed: {}", e);
        }
    }

    Ok(())
}
