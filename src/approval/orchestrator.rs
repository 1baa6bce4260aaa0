//! Single entry point for adapters: notify every channel, then wait.

use std::sync::Arc;
use std::time::Duration;

use super::correlator::ApprovalCorrelator;
use super::dispatcher::NotificationDispatcher;
use super::model::{ApprovalRequest, ApprovalResponse};
use crate::error::Result;

/// Default wait for a human decision (5 minutes).
pub const DEFAULT_APPROVAL_TIMEOUT_SECS: u64 = 300;

pub struct ApprovalOrchestrator {
    dispatcher: NotificationDispatcher,
    correlator: Arc<ApprovalCorrelator>,
    default_timeout: Duration,
}

impl ApprovalOrchestrator {
    pub fn new(
        dispatcher: NotificationDispatcher,
        correlator: Arc<ApprovalCorrelator>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            dispatcher,
            correlator,
            default_timeout,
        }
    }

    /// Ask a human and block until they answer or the default timeout passes.
    pub async fn request_approval(&self, request: ApprovalRequest) -> Result<ApprovalResponse> {
        self.request_approval_with_timeout(request, self.default_timeout)
            .await
    }

    /// Like [`request_approval`](Self::request_approval) with a per-call deadline.
    ///
    /// Dispatch completes before the wait starts, so a dispatch error is returned
    /// without ever registering the request.
    pub async fn request_approval_with_timeout(
        &self,
        request: ApprovalRequest,
        timeout: Duration,
    ) -> Result<ApprovalResponse> {
        self.dispatcher.notify(&request).await?;
        self.correlator.create_and_wait(request, timeout).await
    }

    /// Forward a human decision to the waiting caller.
    pub fn respond(&self, request_id: &str, response: ApprovalResponse) -> bool {
        self.correlator.resolve(request_id, response)
    }

    pub fn list_pending(&self) -> Vec<ApprovalRequest> {
        self.correlator.list_pending()
    }

    pub fn lookup(&self, request_id: &str) -> Option<ApprovalRequest> {
        self.correlator.lookup(request_id)
    }

    pub fn correlator(&self) -> &Arc<ApprovalCorrelator> {
        &self.correlator
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Fail every outstanding request. Returns how many were cancelled.
    pub fn shutdown(&self, reason: &str) -> usize {
        let cancelled = self.correlator.cancel_all(reason);
        if cancelled > 0 {
            tracing::info!("Cancelled {} pending approval request(s): {}", cancelled, reason);
        }
        cancelled
    }
}
