//! Long-polling update loop for the Telegram bot.
//!
//! ```text
//!   getUpdates ──► callback_query ──► correlator.resolve ──► editMessageText
//!        │                                                   answerCallbackQuery
//!        └──────► message.text ──► (spawned) conversation ──► sendMessage
//! ```
//!
//! Button presses are handled inline. Chat text may wait on the relay for a
//! long time, so each message is answered on its own task.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use super::api::{BotApi, CallbackQuery, Message, Update};
use super::{CallbackAction, TelegramConfig};
use crate::approval::{ApprovalCorrelator, ApprovalResponse};
use crate::conversation::{BotConversationService, IncomingMessage};

const RETRY_DELAY: Duration = Duration::from_secs(5);

const UNAUTHORIZED_CHAT_REPLY: &str = "This bot only responds in its configured chat.";

pub struct TelegramPoller {
    api: BotApi,
    poll_timeout: Duration,
    correlator: Arc<ApprovalCorrelator>,
    chat: ChatResponder,
}

/// Answers free-form chat text.
#[derive(Clone)]
struct ChatResponder {
    api: BotApi,
    chat_id: String,
    strict_chat: bool,
    conversation: Arc<BotConversationService>,
}

impl TelegramPoller {
    pub fn new(
        config: &TelegramConfig,
        correlator: Arc<ApprovalCorrelator>,
        conversation: Arc<BotConversationService>,
    ) -> Result<Self> {
        let api = config.api()?;
        Ok(Self {
            chat: ChatResponder {
                api: api.clone(),
                chat_id: config.chat_id.trim().to_string(),
                strict_chat: config.strict_chat,
                conversation,
            },
            api,
            poll_timeout: config.poll_timeout,
            correlator,
        })
    }

    /// Poll until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(chat_id = %self.chat.chat_id, "Telegram poller started");
        let mut offset: i64 = 0;

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.api.get_updates(offset, self.poll_timeout) => result,
            };

            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram getUpdates failed, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("Telegram poller stopped");
    }

    async fn handle_update(&self, update: Update) {
        let update_id = update.update_id;
        if let Some(query) = update.callback_query {
            if let Err(e) = self.handle_callback(query).await {
                tracing::error!(update_id, error = %e, "Failed to handle Telegram callback");
            }
        } else if let Some(message) = update.message {
            let chat = self.chat.clone();
            tokio::spawn(async move {
                if let Err(e) = chat.handle_text(message).await {
                    tracing::error!(update_id, error = %e, "Failed to handle Telegram message");
                }
            });
        }
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        let data = query.data.as_deref().unwrap_or_default();
        let Some(action) = CallbackAction::parse(data) else {
            tracing::warn!(callback_id = %query.id, data, "Ignoring unrecognized callback data");
            return Ok(());
        };

        let approved = action.approved();
        let response = if approved {
            ApprovalResponse::approve("Approved via Telegram")
        } else {
            ApprovalResponse::reject("Rejected via Telegram")
        };

        let resolved = self.correlator.resolve(action.request_id(), response);
        tracing::info!(
            request_id = %action.request_id(),
            approved,
            resolved,
            "Received Telegram decision"
        );

        let verdict = if approved { "Approved" } else { "Rejected" };

        if let Some(message) = &query.message {
            let original = message.text.as_deref().unwrap_or_default();
            let text = if resolved {
                format!("✅ Answered\n\n{}\n\n👉 Result: {}", original, verdict)
            } else {
                format!("⚠️ This request is no longer pending\n\n{}", original)
            };
            if let Err(e) = self
                .api
                .edit_message_text(message.chat.id, message.message_id, &text)
                .await
            {
                tracing::warn!(error = %e, "Failed to update approval message");
            }
        }

        let toast = match (resolved, approved) {
            (true, true) => "✅ Approved",
            (true, false) => "❌ Rejected",
            (false, _) => "This request is no longer pending",
        };
        self.api.answer_callback_query(&query.id, toast).await
    }
}

impl ChatResponder {
    async fn handle_text(&self, message: Message) -> Result<()> {
        let Some(text) = message.text.as_deref().map(str::trim) else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let chat_id = message.chat.id;
        if self.strict_chat && !self.chat_id.is_empty() && chat_id.to_string() != self.chat_id {
            tracing::warn!(chat_id, "Refusing message from unauthorized chat");
            self.api
                .send_message(&chat_id.to_string(), UNAUTHORIZED_CHAT_REPLY, None)
                .await?;
            return Ok(());
        }

        let from = message.from.as_ref();
        let incoming = IncomingMessage {
            platform: "telegram".to_string(),
            chat_id,
            text: text.to_string(),
            username: from.and_then(|u| u.username.clone()),
            first_name: from.and_then(|u| u.first_name.clone()),
            last_name: from.and_then(|u| u.last_name.clone()),
        };

        let reply = self.conversation.handle_message(&incoming).await;
        self.api
            .send_message(&chat_id.to_string(), &reply, None)
            .await?;
        Ok(())
    }
}
