//! Telegram channel for approval workflows.
//!
//! Approval requests are posted to one chat with ✅/❌ inline buttons. Button
//! presses come back through [`TelegramPoller`], which resolves the matching
//! pending request.
//!
//! ## Security
//!
//! - Bot token is NEVER logged
//! - With `strict_chat`, only the configured chat may talk to the bot

mod api;
mod poller;

use std::time::Duration;

use async_trait::async_trait;

use crate::approval::{ApprovalChannel, ApprovalRequest};

pub use api::BotApi;
pub use poller::TelegramPoller;

use api::InlineKeyboardButton;

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token (NEVER log this value)
    bot_token: String,
    /// Chat that receives approval requests
    pub chat_id: String,
    /// Bot username, informational only
    pub bot_username: Option<String>,
    /// Refuse text from chats other than `chat_id`
    pub strict_chat: bool,
    /// Long-poll timeout for getUpdates
    pub poll_timeout: Duration,
    /// Timeout for regular Bot API calls
    pub api_timeout: Duration,
    pub api_base_url: String,
}

impl TelegramConfig {
    #[must_use]
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            bot_username: None,
            strict_chat: true,
            poll_timeout: Duration::from_secs(30),
            api_timeout: Duration::from_secs(10),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    #[must_use]
    pub fn with_strict_chat(mut self, strict: bool) -> Self {
        self.strict_chat = strict;
        self
    }

    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn api(&self) -> anyhow::Result<BotApi> {
        BotApi::new(&self.api_base_url, &self.bot_token, self.api_timeout)
    }
}

// ============================================================================
// Callback data
// ============================================================================

/// Decision carried by an inline button, encoded as `approve:<id>` / `reject:<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Approve(String),
    Reject(String),
}

impl CallbackAction {
    /// Parse button callback data. Anything but a known action with a
    /// non-empty id yields `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let (action, id) = data.split_once(':')?;
        if id.is_empty() || id.contains(':') {
            return None;
        }
        match action {
            "approve" => Some(Self::Approve(id.to_string())),
            "reject" => Some(Self::Reject(id.to_string())),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Approve(id) => format!("approve:{}", id),
            Self::Reject(id) => format!("reject:{}", id),
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            Self::Approve(id) | Self::Reject(id) => id,
        }
    }

    pub fn approved(&self) -> bool {
        matches!(self, Self::Approve(_))
    }
}

// ============================================================================
// Channel
// ============================================================================

pub struct TelegramChannel {
    api: BotApi,
    chat_id: String,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        Ok(Self {
            api: config.api()?,
            chat_id: config.chat_id.clone(),
        })
    }

    fn render_request(request: &ApprovalRequest) -> String {
        let mut text = format!("🤖 Approval request\n\n📝 Question:\n{}\n", request.question);
        if let Some(context) = &request.context {
            text.push_str(&format!("\n📎 Context:\n{}\n", context));
        }
        text.push_str(&format!(
            "\n⏰ Time: {}\n\nChoose a response:",
            request.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        text
    }

    fn buttons(request: &ApprovalRequest) -> [InlineKeyboardButton; 2] {
        [
            InlineKeyboardButton {
                text: "✅ Approve".to_string(),
                callback_data: CallbackAction::Approve(request.id.clone()).encode(),
            },
            InlineKeyboardButton {
                text: "❌ Reject".to_string(),
                callback_data: CallbackAction::Reject(request.id.clone()).encode(),
            },
        ]
    }
}

#[async_trait]
impl ApprovalChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_approval_request(&self, request: &ApprovalRequest) -> anyhow::Result<()> {
        let sent = self
            .api
            .send_message(
                &self.chat_id,
                &Self::render_request(request),
                Some(&Self::buttons(request)[..]),
            )
            .await?;

        tracing::info!(
            request_id = %request.id,
            message_id = sent.message_id,
            "Posted approval request to Telegram"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests {
    use super::*;

    mod callback_tests {
        use super::*;

        #[test]
        fn parses_approve_and_reject() {
            assert_eq!(
                CallbackAction::parse("approve:abc-1"),
                Some(CallbackAction::Approve("abc-1".to_string()))
            );
            assert_eq!(
                CallbackAction::parse("reject:abc-1"),
                Some(CallbackAction::Reject("abc-1".to_string()))
            );
        }

        #[test]
        fn rejects_malformed_data() {
            for data in ["", "approve", "approve:", "maybe:abc", "approve:a:b", ":abc"] {
                assert_eq!(CallbackAction::parse(data), None, "data: {:?}", data);
            }
        }

        #[test]
        fn encode_is_parseable() {
            let action = CallbackAction::Reject("r-9".to_string());
            assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn includes_question_and_context() {
            let request = ApprovalRequest::new("Deploy?", Some("env=prod".to_string()));
            let text = TelegramChannel::render_request(&request);
            assert!(text.contains("Deploy?"));
            assert!(text.contains("📎 Context:\nenv=prod"));
        }

        #[test]
        fn omits_missing_context() {
            let request = ApprovalRequest::new("Deploy?", None);
            assert!(!TelegramChannel::render_request(&request).contains("Context"));
        }

        #[test]
        fn buttons_carry_request_id() {
            let request = ApprovalRequest::with_id("req-1", "Deploy?", None);
            let [approve, reject] = TelegramChannel::buttons(&request);
            assert_eq!(approve.callback_data, "approve:req-1");
            assert_eq!(reject.callback_data, "reject:req-1");
        }
    }

    #[tokio::test]
    async fn sends_message_with_inline_keyboard() {
        let bot = mock::MockBotApi::spawn().await;
        let channel = TelegramChannel::new(&bot.config("999")).unwrap();

        let request = ApprovalRequest::with_id("req-7", "Run tests?", None);
        channel.send_approval_request(&request).await.unwrap();

        let calls = bot.calls("sendMessage");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["chat_id"], "999");
        assert_eq!(
            calls[0]["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "approve:req-7"
        );
        assert_eq!(
            calls[0]["reply_markup"]["inline_keyboard"][0][1]["callback_data"],
            "reject:req-7"
        );
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let bot = mock::MockBotApi::spawn().await;
        bot.fail_method("sendMessage");
        let channel = TelegramChannel::new(&bot.config("999")).unwrap();

        let err = channel
            .send_approval_request(&ApprovalRequest::new("x", None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("sendMessage"));
        assert!(!err.to_string().contains(mock::TEST_TOKEN));
    }
}
