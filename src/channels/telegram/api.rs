//! Minimal Telegram Bot API client.
//!
//! Only the methods askgate needs: `sendMessage`, `editMessageText`,
//! `answerCallbackQuery` and `getUpdates`.
//!
//! ## Security
//!
//! The bot token is part of every request URL. It is never logged and
//! transport errors are stripped of their URL before they propagate.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

// ============================================================================
// Client
// ============================================================================

/// Bot API client bound to one token.
#[derive(Clone)]
pub struct BotApi {
    client: Client,
    base_url: String,
    /// NEVER log this value
    token: String,
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BotApi {
    pub fn new(base_url: &str, token: &str, api_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);

        let mut request = self.client.post(url).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Telegram {} request failed: {}", method, e.without_url()))?;

        let status = response.status();
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| anyhow!("Telegram {} returned an unreadable body: {}", method, e.without_url()))?;

        if !parsed.ok {
            return Err(anyhow!(
                "Telegram {} failed ({}): {}",
                method,
                status,
                parsed.description.unwrap_or_else(|| "no description".to_string())
            ));
        }

        parsed
            .result
            .ok_or_else(|| anyhow!("Telegram {} returned no result", method))
    }

    /// Send a text message, optionally with one row of inline buttons.
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        buttons: Option<&[InlineKeyboardButton]>,
    ) -> Result<Message> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(buttons) = buttons {
            body["reply_markup"] = json!({ "inline_keyboard": [buttons] });
        }

        self.call("sendMessage", body, None).await
    }

    /// Replace the text of a message (drops its inline keyboard).
    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let _: Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                }),
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({
                    "callback_query_id": callback_query_id,
                    "text": text,
                }),
                None,
            )
            .await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, poll_timeout: Duration) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": poll_timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
            // The server holds the request for up to poll_timeout
            Some(poll_timeout + Duration::from_secs(10)),
        )
        .await
    }
}
