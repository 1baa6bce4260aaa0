//! CLI bootstrap - Initialize the approval stack from settings and arguments.
//!
//! Resolution order for every value: CLI arg > settings file > environment
//! fallback > built-in default.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::approval::{
    ApprovalChannel, ApprovalCorrelator, ApprovalOrchestrator, NotificationDispatcher,
};
use crate::channels::{TelegramChannel, TelegramConfig, TelegramPoller};
use crate::conversation::{BotConversationService, ChatRelayClient, RelayConfig};
use crate::settings::{get_with_env_fallback, AskgateSettings, SettingsManager};

use super::args::Args;

/// Everything `run` needs, fully wired.
pub struct AppContext {
    pub orchestrator: Arc<ApprovalOrchestrator>,

    /// Update loop for the Telegram bot, when the channel is enabled
    pub poller: Option<TelegramPoller>,

    pub host: String,
    pub port: u16,

    /// Settings manager
    pub settings_manager: Arc<SettingsManager>,
}

/// Initialize logging, settings, channels and the orchestrator.
pub async fn initialize(args: &Args) -> Result<AppContext> {
    // Load .env file if present
    let dotenv_result = dotenvy::dotenv();

    // Load settings
    let settings_manager = match &args.config {
        Some(path) => SettingsManager::with_path(path.clone()).await,
        None => SettingsManager::new().await,
    };
    let settings_manager =
        Arc::new(settings_manager.context("Failed to initialize settings manager")?);

    let settings = settings_manager.get().await;

    init_logging(args, &settings)?;

    if let Err(e) = dotenv_result {
        // Only warn on errors other than file not found
        if !matches!(e, dotenvy::Error::Io(_)) {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // Ensure settings file exists (creates template on first run)
    if args.config.is_none() {
        if let Err(e) = settings_manager.ensure_settings_file().await {
            tracing::warn!("Failed to create settings template: {}", e);
        }
    }

    tracing::info!("Settings: {}", settings_manager.path().display());

    let timeout_secs = args.timeout_secs.unwrap_or(settings.approval.timeout_secs);
    let correlator = Arc::new(ApprovalCorrelator::new(settings.approval.history_limit));

    let mut channels: Vec<Arc<dyn ApprovalChannel>> = Vec::new();
    let mut poller = None;

    if let Some(config) = telegram_config(args, &settings) {
        tracing::info!(
            bot = config.bot_username.as_deref().unwrap_or("unknown"),
            chat_id = %config.chat_id,
            strict_chat = config.strict_chat,
            "Telegram channel enabled"
        );

        let conversation = Arc::new(BotConversationService::new(Arc::new(relay_client(
            &settings,
        ))));

        channels.push(Arc::new(
            TelegramChannel::new(&config).context("Failed to create Telegram channel")?,
        ));
        poller = Some(
            TelegramPoller::new(&config, correlator.clone(), conversation)
                .context("Failed to create Telegram poller")?,
        );
    }

    if channels.is_empty() {
        tracing::warn!("No approval channels configured; approval requests will fail");
    }

    let dispatcher = NotificationDispatcher::new(channels);
    tracing::info!(
        channels = ?dispatcher.channel_names(),
        timeout_secs,
        history_limit = settings.approval.history_limit,
        "Approval gateway configured"
    );

    let orchestrator = Arc::new(ApprovalOrchestrator::new(
        dispatcher,
        correlator,
        Duration::from_secs(timeout_secs),
    ));

    Ok(AppContext {
        orchestrator,
        poller,
        host: args
            .host
            .clone()
            .unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
        settings_manager,
    })
}

fn init_logging(args: &Args, settings: &AskgateSettings) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        settings.advanced.log_level.as_str()
    };

    let directive = format!("askgate={}", log_level)
        .parse::<tracing_subscriber::filter::Directive>()
        .with_context(|| format!("Invalid log level: {}", log_level))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .try_init();

    Ok(())
}

/// Resolve Telegram settings. `None` when disabled or incomplete.
fn telegram_config(args: &Args, settings: &AskgateSettings) -> Option<TelegramConfig> {
    let telegram = &settings.telegram;
    if args.no_telegram || !telegram.enabled {
        tracing::info!("Telegram channel disabled");
        return None;
    }

    let token = get_with_env_fallback(&telegram.bot_token, &["TELEGRAM_BOT_TOKEN"], None);
    let chat_id = get_with_env_fallback(&telegram.chat_id, &["TELEGRAM_CHAT_ID"], None);
    let username =
        get_with_env_fallback(&telegram.bot_username, &["TELEGRAM_BOT_USERNAME"], None);

    let (Some(token), Some(chat_id)) = (token, chat_id) else {
        tracing::warn!(
            "Telegram channel enabled but bot token or chat id is missing \
             (set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID)"
        );
        return None;
    };

    Some(
        TelegramConfig::new(token, chat_id)
            .with_bot_username(username)
            .with_strict_chat(telegram.strict_chat)
            .with_poll_timeout(Duration::from_secs(telegram.poll_timeout_secs))
            .with_api_base_url(telegram.api_base_url.clone()),
    )
}

/// Build the chat relay client. An invalid URL disables the relay.
fn relay_client(settings: &AskgateSettings) -> ChatRelayClient {
    let url = get_with_env_fallback(&settings.relay.url, &["RELAY_URL"], None);
    let token = get_with_env_fallback(&settings.relay.token, &["RELAY_TOKEN"], None);
    let config = RelayConfig::new(url, token)
        .with_timeout(Duration::from_secs(settings.relay.timeout_secs));

    match ChatRelayClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Chat relay disabled: {:#}", e);
            ChatRelayClient::unconfigured()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telegram_settings(token: Option<&str>, chat_id: Option<&str>) -> AskgateSettings {
        let mut settings = AskgateSettings::default();
        settings.telegram.bot_token = token.map(String::from);
        settings.telegram.chat_id = chat_id.map(String::from);
        settings
    }

    #[test]
    fn configured_telegram_is_enabled() {
        let args = Args::default();
        // Settings values win over the environment, so a configured value is enough
        assert!(telegram_config(&args, &telegram_settings(Some("1:a"), Some("42"))).is_some());
    }

    #[test]
    fn no_telegram_flag_disables_channel() {
        let args = Args {
            no_telegram: true,
            ..Args::default()
        };
        assert!(telegram_config(&args, &telegram_settings(Some("1:a"), Some("42"))).is_none());
    }

    #[test]
    fn disabled_in_settings() {
        let mut settings = telegram_settings(Some("1:a"), Some("42"));
        settings.telegram.enabled = false;
        assert!(telegram_config(&Args::default(), &settings).is_none());
    }

    #[test]
    fn invalid_relay_url_falls_back_to_unconfigured() {
        let mut settings = AskgateSettings::default();
        settings.relay.url = Some("not a url".to_string());
        assert!(!relay_client(&settings).is_configured());
    }

    #[tokio::test]
    async fn initialize_with_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("askgate.toml");
        std::fs::write(
            &path,
            r#"
                [server]
                port = 9123
                [approval]
                timeout_secs = 12
            "#,
        )
        .unwrap();

        let args = Args {
            config: Some(path),
            host: Some("0.0.0.0".to_string()),
            no_telegram: true,
            ..Args::default()
        };
        let ctx = initialize(&args).await.unwrap();

        assert_eq!(ctx.host, "0.0.0.0");
        assert_eq!(ctx.port, 9123);
        assert_eq!(ctx.orchestrator.default_timeout(), Duration::from_secs(12));
        assert!(ctx.poller.is_none());
    }

    #[tokio::test]
    async fn timeout_flag_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            config: Some(dir.path().join("missing.toml")),
            timeout_secs: Some(5),
            no_telegram: true,
            ..Args::default()
        };
        let ctx = initialize(&args).await.unwrap();

        assert_eq!(ctx.orchestrator.default_timeout(), Duration::from_secs(5));
        // Explicit config paths are never generated
        assert!(!ctx.settings_manager.path().exists());
    }
}
