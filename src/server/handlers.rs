//! HTTP request handlers for the approval gateway.
//!
//! `/ask` and the permission hook block until a human answers, so a hook
//! script's HTTP timeout must exceed the approval timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::sync::CancellationToken;

use super::types::*;
use crate::approval::{ApprovalOrchestrator, ApprovalRequest};
use crate::hook::{PermissionHookInput, PermissionHookOutput};

/// Application state shared across all handlers
pub struct AppState {
    pub orchestrator: Arc<ApprovalOrchestrator>,
    /// Shutdown token for graceful server shutdown
    pub shutdown_token: CancellationToken,
}

impl AppState {
    pub fn new(orchestrator: Arc<ApprovalOrchestrator>) -> (Arc<Self>, CancellationToken) {
        let shutdown_token = CancellationToken::new();
        let state = Arc::new(Self {
            orchestrator,
            shutdown_token: shutdown_token.clone(),
        });
        (state, shutdown_token)
    }
}

// =============================================================================
// Health Check
// =============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Ask
// =============================================================================

/// Ask a human and wait for the decision.
///
/// # Response
///
/// - `200 OK` with `AskResponse`: a human decided
/// - `200 OK` with `AskFailure`: the request timed out or was cancelled
/// - `400 Bad Request` with `AskFailure`: the body is not a valid `AskRequest`
/// - `500 Internal Server Error` with `AskFailure`: anything else (e.g. no channels)
pub async fn ask(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req: AskRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable ask payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(AskFailure::new(format!("Invalid request: {}", e))),
            )
                .into_response();
        }
    };

    let request = ApprovalRequest::new(req.question.clone(), req.context_text());
    let request_id = request.id.clone();

    let timeout = req
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.orchestrator.default_timeout());

    tracing::info!(
        request_id = %request_id,
        event = req.event.as_deref().unwrap_or("unknown"),
        timeout_secs = timeout.as_secs(),
        "Received approval request"
    );

    match state
        .orchestrator
        .request_approval_with_timeout(request, timeout)
        .await
    {
        Ok(response) => {
            Json(AskResponse::from_response(request_id, &response)).into_response()
        }
        Err(e) if e.is_expiry() => {
            tracing::warn!(request_id = %request_id, "{}", e);
            Json(AskFailure::new(format!("Timed out or cancelled: {}", e))).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Approval request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AskFailure::new(format!("Approval failed: {}", e))),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Respond
// =============================================================================

/// Deliver a decision for a pending request.
pub async fn respond(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RespondRequest>,
) -> Json<RespondResponse> {
    let resolved = state
        .orchestrator
        .respond(&req.request_id, req.to_response());

    Json(RespondResponse {
        request_id: req.request_id,
        resolved,
    })
}

// =============================================================================
// Inspection
// =============================================================================

pub async fn list_pending(State(state): State<Arc<AppState>>) -> Json<Vec<ApprovalRequest>> {
    Json(state.orchestrator.list_pending())
}

/// Look up a request by id, pending or resolved.
///
/// # Response
///
/// - `200 OK`: the request
/// - `404 Not Found`: unknown id (or evicted from history)
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Result<Json<ApprovalRequest>, (StatusCode, Json<ErrorResponse>)> {
    state.orchestrator.lookup(&request_id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::with_code(
                format!("Request not found: {}", request_id),
                "REQUEST_NOT_FOUND",
            )),
        )
    })
}

// =============================================================================
// Permission hook
// =============================================================================

/// Gate an agent tool call on a human decision.
///
/// Always answers `200 OK`: unreadable input and every failure become a deny.
pub async fn permission_request(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<PermissionHookOutput> {
    let input: PermissionHookInput = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable permission hook payload");
            PermissionHookInput::default()
        }
    };

    let request = input.to_request();
    tracing::info!(
        request_id = %request.id,
        tool = input.tool_name(),
        "Received permission request"
    );

    let output = match state.orchestrator.request_approval(request).await {
        Ok(response) => PermissionHookOutput::from_response(&response),
        Err(e) => {
            tracing::warn!(error = %e, "Permission request failed, denying");
            PermissionHookOutput::deny(format!("Approval failed: {}", e))
        }
    };

    Json(output)
}
