//! HTTP server exposing the approval gateway to hook scripts.
//!
//! # Architecture
//!
//! ```text
//! +--------------------------------------------------+
//! |  Axum HTTP Server                                |
//! |  /api/hook/health (GET)        -> health check   |
//! |  /api/hook/ask (POST)          -> ask and wait   |
//! |  /api/hook/respond (POST)      -> resolve        |
//! |  /api/hook/pending (GET)       -> pending list   |
//! |  /api/hook/request/{id} (GET)  -> lookup         |
//! |  /api/claude-hook/permission-request (POST)      |
//! +--------------------------------------------------+
//!          |
//!          v
//! +--------------------------------------------------+
//! |  ApprovalOrchestrator                            |
//! |    dispatcher (fan-out) -> correlator (wait)     |
//! +--------------------------------------------------+
//! ```

mod handlers;
pub mod types;

pub use handlers::AppState;
pub use types::{
    AskFailure, AskRequest, AskResponse, ErrorResponse, HealthResponse, RespondRequest,
    RespondResponse,
};

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Start the HTTP server.
///
/// # Arguments
///
/// * `host` - Interface to bind
/// * `port` - Port to listen on. Use 0 for a random available port.
/// * `state` - Shared state from [`AppState::new`]
///
/// # Returns
///
/// The actual bound address (useful when port=0) and the state's shutdown token.
pub async fn start_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
) -> anyhow::Result<(SocketAddr, CancellationToken)> {
    let shutdown_token = state.shutdown_token.clone();
    let app = create_router(state);

    let listener = TcpListener::bind((host, port)).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("HTTP server listening on {}", actual_addr);

    // Run server with graceful shutdown
    let server_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_token))
}

/// Create the router with all routes configured.
///
/// This is separated from `start_server` to enable easier testing.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/hook/health", get(handlers::health))
        .route("/api/hook/ask", post(handlers::ask))
        .route("/api/hook/respond", post(handlers::respond))
        .route("/api/hook/pending", get(handlers::list_pending))
        .route("/api/hook/request/{request_id}", get(handlers::get_request))
        .route(
            "/api/claude-hook/permission-request",
            post(handlers::permission_request),
        )
        .with_state(state)
}
