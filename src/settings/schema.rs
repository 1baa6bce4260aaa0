//! Settings schema definitions for askgate configuration.
//!
//! All settings structs use `#[serde(default)]` to allow partial configuration files.
//! Missing fields are filled with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::approval::{DEFAULT_APPROVAL_TIMEOUT_SECS, DEFAULT_HISTORY_LIMIT};

/// Root settings structure.
///
/// Loaded from `~/.askgate/settings.toml` with environment variable interpolation support.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AskgateSettings {
    /// Schema version for migrations
    pub version: u32,

    /// HTTP server binding
    pub server: ServerSettings,

    /// Approval wait behavior
    pub approval: ApprovalSettings,

    /// Telegram bot channel
    pub telegram: TelegramSettings,

    /// Free-text chat relay
    pub relay: RelaySettings,

    /// Advanced/debug settings
    pub advanced: AdvancedSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to listen on (0 picks a random port)
    pub port: u16,
}

/// Approval wait settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSettings {
    /// Default seconds to wait for a human decision
    pub timeout_secs: u64,

    /// Requests kept for lookup after they resolve (0 = unbounded)
    pub history_limit: usize,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Register the Telegram channel at startup
    pub enabled: bool,

    /// Bot token (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Bot username, informational
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_username: Option<String>,

    /// Chat that receives approval requests (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,

    /// Only talk to the configured chat
    pub strict_chat: bool,

    /// Long-poll timeout for getUpdates
    pub poll_timeout_secs: u64,

    /// Bot API base URL
    pub api_base_url: String,
}

/// Chat relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Relay endpoint (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Bearer token for the relay (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Seconds to wait for a relay reply
    pub timeout_secs: u64,
}

/// Advanced/debug settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Log level: "error" | "warn" | "info" | "debug" | "trace"
    pub log_level: String,
}

// =============================================================================
// Default implementations
// =============================================================================

impl Default for AskgateSettings {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSettings::default(),
            approval: ApprovalSettings::default(),
            telegram: TelegramSettings::default(),
            relay: RelaySettings::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_APPROVAL_TIMEOUT_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: None,
            bot_username: None,
            chat_id: None,
            strict_chat: true,
            poll_timeout_secs: 30,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 90,
        }
    }
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
