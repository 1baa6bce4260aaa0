//! HTTP client that forwards free-text chat to an LLM backend.
//!
//! The relay is best-effort: every failure is turned into a message for the
//! chat user instead of an error.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::IncomingMessage;

/// Default seconds to wait for a relay reply.
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 90;

pub(crate) const NOT_CONFIGURED_REPLY: &str = "⚠️ The chat relay is not configured yet.\n\
Set RELAY_URL (for example http://localhost:18789/api/chat) and try again.";

pub(crate) const EMPTY_REPLY: &str = "The relay answered, but there was no message to show.";

/// Relay connection settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub url: Option<String>,
    /// Bearer token (NEVER log this value)
    token: Option<String>,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn new(url: Option<String>, token: Option<String>) -> Self {
        Self {
            url: url.filter(|u| !u.trim().is_empty()),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout: Duration::from_secs(DEFAULT_RELAY_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayPayload<'a> {
    chat_id: i64,
    message: &'a str,
    username: Option<&'a str>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
}

/// Chat relay client.
pub struct ChatRelayClient {
    client: Client,
    url: Option<Url>,
    token: Option<String>,
}

impl ChatRelayClient {
    /// Build a relay client. Fails only when a configured URL is not a valid http(s) URL.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .map(|raw| {
                let url = Url::parse(raw.trim()).context("Invalid relay URL")?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!("Relay URL must use http or https, got {}", url.scheme());
                }
                Ok(url)
            })
            .transpose()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build relay HTTP client")?;

        Ok(Self {
            client,
            url,
            token: config.token,
        })
    }

    /// A client with no endpoint; every message gets the setup hint.
    pub fn unconfigured() -> Self {
        Self {
            client: Client::new(),
            url: None,
            token: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Forward a user message and return the text to show in chat.
    pub async fn send_user_message(&self, message: &IncomingMessage) -> String {
        let Some(url) = &self.url else {
            return NOT_CONFIGURED_REPLY.to_string();
        };

        match self.post(url, message).await {
            Ok(Some(reply)) => reply,
            Ok(None) => EMPTY_REPLY.to_string(),
            Err(e) => {
                tracing::error!(chat_id = message.chat_id, error = %e, "Failed to relay chat message");
                format!("❌ The relay call failed: {e}")
            }
        }
    }

    async fn post(&self, url: &Url, message: &IncomingMessage) -> Result<Option<String>> {
        let payload = RelayPayload {
            chat_id: message.chat_id,
            message: &message.text,
            username: message.username.as_deref(),
            first_name: message.first_name.as_deref(),
            last_name: message.last_name.as_deref(),
        };

        let mut request = self.client.post(url.clone()).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(chat_id = message.chat_id, "Relaying chat message");

        let response = request.send().await.context("Relay request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("relay returned HTTP {}", status);
        }

        let body: Value = response
            .json()
            .await
            .context("Relay response was not JSON")?;

        Ok(extract_reply(&body))
    }
}

/// Pick the reply text out of a relay response.
fn extract_reply(body: &Value) -> Option<String> {
    ["reply", "message", "text"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}
