//! Request, response and status types for a single approval cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an approval request.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Waiting for a decision
    Pending,
    /// A human approved
    Approved,
    /// A human rejected
    Rejected,
    /// Expired, cancelled or abandoned
    Timeout,
}

impl ApprovalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }

    /// Terminal status for a human decision.
    pub fn from_decision(approved: bool) -> Self {
        if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        }
    }
}

/// A question put to a human approver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalRequest {
    /// Unique ID for this request
    pub id: String,
    /// What the human is asked to approve
    pub question: String,
    /// Optional free-form detail shown alongside the question
    #[serde(default)]
    pub context: Option<String>,
    /// When the request was created
    pub timestamp: DateTime<Utc>,
    /// Current status
    pub status: ApprovalStatus,
}

impl ApprovalRequest {
    /// Create a pending request with a generated UUID v4 id.
    pub fn new(question: impl Into<String>, context: Option<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), question, context)
    }

    /// Create a pending request with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        question: impl Into<String>,
        context: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            context,
            timestamp: Utc::now(),
            status: ApprovalStatus::Pending,
        }
    }

    /// Move to `next` if the request is still pending.
    ///
    /// Returns `false` (and leaves the status alone) once a terminal state is reached.
    pub fn transition(&mut self, next: ApprovalStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = next;
        true
    }
}

/// A human's decision on a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalResponse {
    /// Whether the request was approved
    pub approved: bool,
    /// Optional message from the approver
    #[serde(default)]
    pub message: Option<String>,
}

impl ApprovalResponse {
    pub fn approve(message: impl Into<String>) -> Self {
        Self {
            approved: true,
            message: Some(message.into()),
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            approved: false,
            message: Some(message.into()),
        }
    }

    /// The approver's message, or a default describing the decision.
    pub fn message_or_default(&self) -> String {
        match &self.message {
            Some(m) if !m.is_empty() => m.clone(),
            _ if self.approved => "Approved".to_string(),
            _ => "Rejected".to_string(),
        }
    }
}
