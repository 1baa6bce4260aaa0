//! Request/Response types for the HTTP server.
//!
//! These types define the wire format for all HTTP API endpoints. Field names
//! are camelCase where hook scripts expect it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::approval::ApprovalResponse;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Server status (always "UP" when healthy)
    pub status: String,
    pub service: String,
    /// Server version from Cargo.toml
    pub version: String,
}

impl HealthResponse {
    /// Create a healthy response with the current package version
    pub fn healthy() -> Self {
        Self {
            status: "UP".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic approval question posted by a hook script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Hook event name, logged only
    #[serde(default)]
    pub event: Option<String>,

    pub question: String,

    /// Free-form context; non-string JSON is rendered as JSON text
    #[serde(default)]
    pub context: Option<Value>,

    /// Per-request wait in seconds (defaults to the server setting)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl AskRequest {
    pub fn context_text(&self) -> Option<String> {
        match &self.context {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Decision returned to the asking hook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub approved: bool,
    pub message: String,
    pub request_id: String,
}

impl AskResponse {
    pub fn from_response(request_id: impl Into<String>, response: &ApprovalResponse) -> Self {
        Self {
            approved: response.approved,
            message: response.message_or_default(),
            request_id: request_id.into(),
        }
    }
}

/// Failure payload for `/ask`. `approved` is always false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskFailure {
    pub approved: bool,
    pub message: String,
    pub error: bool,
}

impl AskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            approved: false,
            message: message.into(),
            error: true,
        }
    }
}

/// Human decision posted by an out-of-band responder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub request_id: String,
    pub approved: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl RespondRequest {
    pub fn to_response(&self) -> ApprovalResponse {
        ApprovalResponse {
            approved: self.approved,
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub request_id: String,
    /// False when the request was not pending (unknown, already answered or expired)
    pub resolved: bool,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code for programmatic handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create an error response with a message and code
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod health_response_tests {
        use super::*;

        #[test]
        fn healthy_returns_up_status() {
            let resp = HealthResponse::healthy();
            assert_eq!(resp.status, "UP");
            assert_eq!(resp.service, "askgate");
        }

        #[test]
        fn healthy_includes_version() {
            let resp = HealthResponse::healthy();
            // Should match Cargo.toml version
            assert_eq!(resp.version, env!("CARGO_PKG_VERSION"));
        }
    }

    mod ask_request_tests {
        use super::*;

        #[test]
        fn minimal_body() {
            let req: AskRequest = serde_json::from_str(r#"{"question":"Deploy?"}"#).unwrap();
            assert_eq!(req.question, "Deploy?");
            assert!(req.event.is_none());
            assert!(req.context_text().is_none());
            assert!(req.timeout_secs.is_none());
        }

        #[test]
        fn string_context_is_kept_verbatim() {
            let req: AskRequest =
                serde_json::from_value(json!({"question": "q", "context": "env=prod"})).unwrap();
            assert_eq!(req.context_text().as_deref(), Some("env=prod"));
        }

        #[test]
        fn structured_context_is_rendered_as_json() {
            let req: AskRequest =
                serde_json::from_value(json!({"question": "q", "context": {"env": "prod"}}))
                    .unwrap();
            assert_eq!(req.context_text().as_deref(), Some(r#"{"env":"prod"}"#));
        }

        #[test]
        fn missing_question_is_rejected() {
            assert!(serde_json::from_str::<AskRequest>(r#"{"event":"x"}"#).is_err());
        }
    }

    mod ask_response_tests {
        use super::*;

        #[test]
        fn success_shape() {
            let resp = AskResponse::from_response("r-1", &ApprovalResponse::approve("ok"));
            assert_eq!(
                serde_json::to_value(resp).unwrap(),
                json!({"approved": true, "message": "ok", "requestId": "r-1"})
            );
        }

        #[test]
        fn default_message_on_reject() {
            let resp = AskResponse::from_response(
                "r-1",
                &ApprovalResponse {
                    approved: false,
                    message: None,
                },
            );
            assert_eq!(resp.message, "Rejected");
        }

        #[test]
        fn failure_shape() {
            assert_eq!(
                serde_json::to_value(AskFailure::new("timed out")).unwrap(),
                json!({"approved": false, "message": "timed out", "error": true})
            );
        }
    }

    #[test]
    fn respond_request_uses_camel_case() {
        let req: RespondRequest =
            serde_json::from_value(json!({"requestId": "r-1", "approved": false})).unwrap();
        assert_eq!(req.request_id, "r-1");
        assert_eq!(req.to_response(), ApprovalResponse {
            approved: false,
            message: None,
        });
    }

    #[test]
    fn error_response_with_code() {
        let err = ErrorResponse::with_code("Not found", "NOT_FOUND");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
    }
}
