//! Approval correlation: ask a human over one or more channels and wait.
//!
//! This module provides:
//! - `ApprovalRequest` / `ApprovalResponse`: one approval cycle
//! - `NotificationDispatcher`: best-effort fan-out to every `ApprovalChannel`
//! - `ApprovalCorrelator`: pending table with exactly-once resolution
//! - `ApprovalOrchestrator`: notify-then-wait facade used by adapters

mod correlator;
mod dispatcher;
mod model;
mod orchestrator;

pub use correlator::{ApprovalCorrelator, DEFAULT_HISTORY_LIMIT};
pub use dispatcher::{ApprovalChannel, NotificationDispatcher};
pub use model::{ApprovalRequest, ApprovalResponse, ApprovalStatus};
pub use orchestrator::{ApprovalOrchestrator, DEFAULT_APPROVAL_TIMEOUT_SECS};

#[cfg(test)]
pub(crate) use dispatcher::test_support;
