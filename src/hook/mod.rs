//! Translation between agent permission hooks and approval requests.
//!
//! A permission hook posts the raw tool call it wants to run:
//!
//! ```json
//! {
//!   "tool_name": "Bash",
//!   "tool_input": { "command": "rm -rf /tmp/x", "description": "Clean up" },
//!   "session_id": "abc",
//!   "cwd": "/home/me/project"
//! }
//! ```
//!
//! and expects a `hookSpecificOutput` decision back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::approval::{ApprovalRequest, ApprovalResponse};

/// Hook event name echoed back in every decision.
pub const PERMISSION_REQUEST_EVENT: &str = "PermissionRequest";

/// Raw permission-hook payload. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionHookInput {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Map<String, Value>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl PermissionHookInput {
    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("Unknown")
    }

    fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input.as_ref()?.get(key)?.as_str()
    }

    /// Human-readable question for this tool call.
    pub fn question(&self) -> String {
        match self.tool_name() {
            "Bash" => {
                let command = self.input_str("command").unwrap_or("unknown command");
                let description = self.input_str("description").unwrap_or("No description");
                format!(
                    "Run this Bash command?\n\nCommand: {}\nDescription: {}",
                    command, description
                )
            }
            "Write" | "Edit" => format!(
                "Modify this file?\n\nFile: {}",
                self.input_str("file_path").unwrap_or("unknown file")
            ),
            "Read" => format!(
                "Read this file?\n\nFile: {}",
                self.input_str("file_path").unwrap_or("unknown file")
            ),
            other => format!("Allow the {} tool to run?", other),
        }
    }

    /// Context block shown under the question.
    pub fn context(&self) -> String {
        let input = self
            .tool_input
            .as_ref()
            .map(|m| Value::Object(m.clone()).to_string())
            .unwrap_or_else(|| "{}".to_string());

        format!(
            "Tool: {}\nSession: {}\nPath: {}\nInput: {}",
            self.tool_name(),
            self.session_id.as_deref().unwrap_or("unknown"),
            self.cwd.as_deref().unwrap_or("unknown"),
            input
        )
    }

    pub fn to_request(&self) -> ApprovalRequest {
        ApprovalRequest::new(self.question(), Some(self.context()))
    }
}

/// Decision returned to the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "lowercase")]
pub enum HookDecision {
    Allow,
    Deny { message: String, interrupt: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub decision: HookDecision,
}

/// Top-level hook response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionHookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

impl PermissionHookOutput {
    pub fn allow() -> Self {
        Self::with_decision(HookDecision::Allow)
    }

    pub fn deny(message: impl Into<String>) -> Self {
        Self::with_decision(HookDecision::Deny {
            message: message.into(),
            interrupt: false,
        })
    }

    pub fn from_response(response: &ApprovalResponse) -> Self {
        if response.approved {
            Self::allow()
        } else {
            Self::deny(response.message_or_default())
        }
    }

    fn with_decision(decision: HookDecision) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: PERMISSION_REQUEST_EVENT.to_string(),
                decision,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> PermissionHookInput {
        serde_json::from_value(value).unwrap()
    }

    mod question_tests {
        use super::*;

        #[test]
        fn bash_includes_command_and_description() {
            let hook = input(json!({
                "tool_name": "Bash",
                "tool_input": {"command": "rm -rf /tmp/x", "description": "Clean up"}
            }));
            let q = hook.question();
            assert!(q.contains("Command: rm -rf /tmp/x"));
            assert!(q.contains("Description: Clean up"));
        }

        #[test]
        fn bash_without_input_uses_placeholders() {
            let hook = input(json!({"tool_name": "Bash"}));
            let q = hook.question();
            assert!(q.contains("unknown command"));
            assert!(q.contains("No description"));
        }

        #[test]
        fn write_and_edit_name_the_file() {
            for tool in ["Write", "Edit"] {
                let hook = input(json!({
                    "tool_name": tool,
                    "tool_input": {"file_path": "/src/main.rs"}
                }));
                assert!(hook.question().starts_with("Modify this file?"));
                assert!(hook.question().contains("/src/main.rs"));
            }
        }

        #[test]
        fn unknown_tool_is_named() {
            let hook = input(json!({"tool_name": "WebFetch"}));
            assert_eq!(hook.question(), "Allow the WebFetch tool to run?");
        }

        #[test]
        fn missing_tool_name_is_unknown() {
            let hook = input(json!({}));
            assert_eq!(hook.tool_name(), "Unknown");
        }
    }

    #[test]
    fn context_lists_session_and_path() {
        let hook = input(json!({
            "tool_name": "Read",
            "tool_input": {"file_path": "a.txt"},
            "session_id": "s-1",
            "cwd": "/work"
        }));
        let ctx = hook.context();
        assert!(ctx.contains("Tool: Read"));
        assert!(ctx.contains("Session: s-1"));
        assert!(ctx.contains("Path: /work"));
        assert!(ctx.contains("\"file_path\":\"a.txt\""));
    }

    #[test]
    fn to_request_is_pending_with_context() {
        let hook = input(json!({"tool_name": "Bash", "tool_input": {"command": "ls"}}));
        let request = hook.to_request();
        assert!(request.question.contains("ls"));
        assert!(request.context.unwrap().contains("Tool: Bash"));
    }

    mod output_tests {
        use super::*;

        #[test]
        fn allow_shape() {
            let value = serde_json::to_value(PermissionHookOutput::allow()).unwrap();
            assert_eq!(
                value,
                json!({
                    "hookSpecificOutput": {
                        "hookEventName": "PermissionRequest",
                        "decision": {"behavior": "allow"}
                    }
                })
            );
        }

        #[test]
        fn deny_shape() {
            let value = serde_json::to_value(PermissionHookOutput::deny("nope")).unwrap();
            assert_eq!(
                value,
                json!({
                    "hookSpecificOutput": {
                        "hookEventName": "PermissionRequest",
                        "decision": {"behavior": "deny", "message": "nope", "interrupt": false}
                    }
                })
            );
        }

        #[test]
        fn rejection_without_message_uses_default() {
            let response = ApprovalResponse {
                approved: false,
                message: None,
            };
            assert_eq!(
                PermissionHookOutput::from_response(&response),
                PermissionHookOutput::deny("Rejected")
            );
        }
    }
}
