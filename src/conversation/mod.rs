//! Channel-independent bot conversation.
//!
//! Chat channels hand every incoming text message to [`BotConversationService`],
//! which answers bot commands itself and relays everything else.

pub mod relay;

use std::sync::Arc;

pub use relay::{ChatRelayClient, RelayConfig, DEFAULT_RELAY_TIMEOUT_SECS};

const START_REPLY: &str = "🔥 askgate bot connected.\n\
Plain messages are forwarded to the chat relay.\n\
\n\
Commands:\n\
/help - usage\n\
/health - check the bot is alive";

const HELP_REPLY: &str = "Usage:\n\
1) Approval requests arrive with ✅/❌ buttons, press one to answer\n\
2) Any other text is forwarded to the chat relay\n\
\n\
Configuration:\n\
- RELAY_URL\n\
- RELAY_TOKEN (optional)";

const HEALTH_REPLY: &str = "✅ bot alive";

/// A text message received on some chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub platform: String,
    pub chat_id: i64,
    pub text: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct BotConversationService {
    relay: Arc<ChatRelayClient>,
}

impl BotConversationService {
    pub fn new(relay: Arc<ChatRelayClient>) -> Self {
        Self { relay }
    }

    /// Produce the reply for an incoming message.
    pub async fn handle_message(&self, message: &IncomingMessage) -> String {
        let text = message.text.trim();

        match text {
            "/start" => START_REPLY.to_string(),
            "/help" => HELP_REPLY.to_string(),
            "/health" => HEALTH_REPLY.to_string(),
            _ => {
                let trimmed = IncomingMessage {
                    text: text.to_string(),
                    ..message.clone()
                };
                self.relay.send_user_message(&trimmed).await
            }
        }
    }
}
