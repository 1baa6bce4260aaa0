use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("No approval channels configured")]
    NoChannels,

    #[error("Approval request {0} is already pending")]
    DuplicateRequest(String),

    #[error("Approval request {request_id} timed out after {timeout:?}")]
    Timeout {
        request_id: String,
        timeout: Duration,
    },

    #[error("Approval request {request_id} cancelled: {reason}")]
    Cancelled { request_id: String, reason: String },

    #[error("Approval request {0} was abandoned without a decision")]
    Abandoned(String),
}

impl ApprovalError {
    /// Whether this is an expected expiry outcome rather than a fault.
    pub fn is_expiry(&self) -> bool {
        matches!(
            self,
            ApprovalError::Timeout { .. } | ApprovalError::Cancelled { .. }
        )
    }
}

// Serialize as the display string for JSON error bodies
impl Serialize for ApprovalError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_covers_timeout_and_cancel() {
        assert!(ApprovalError::Timeout {
            request_id: "a".into(),
            timeout: Duration::from_secs(2)
        }
        .is_expiry());
        assert!(ApprovalError::Cancelled {
            request_id: "a".into(),
            reason: "shutdown".into()
        }
        .is_expiry());
        assert!(!ApprovalError::NoChannels.is_expiry());
        assert!(!ApprovalError::DuplicateRequest("a".into()).is_expiry());
    }

    #[test]
    fn timeout_message_keeps_sub_second_precision() {
        let err = ApprovalError::Timeout {
            request_id: "t".into(),
            timeout: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "Approval request t timed out after 500ms");

        let err = ApprovalError::Timeout {
            request_id: "t".into(),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "Approval request t timed out after 2s");
    }

    #[test]
    fn serializes_as_message() {
        let json = serde_json::to_string(&ApprovalError::NoChannels).unwrap();
        assert_eq!(json, "\"No approval channels configured\"");
    }
}
