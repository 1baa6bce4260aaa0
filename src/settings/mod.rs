//! TOML-based settings for askgate.
//!
//! Settings are loaded from `~/.askgate/settings.toml` with environment variable
//! interpolation support. Secrets can also come straight from the environment
//! through the `get_with_env_fallback` helper.
//!
//! # Usage
//!
//! ```rust,ignore
//! use askgate_lib::settings::{SettingsManager, get_with_env_fallback};
//!
//! let manager = SettingsManager::new().await?;
//! let settings = manager.get().await;
//!
//! let token = get_with_env_fallback(
//!     &settings.telegram.bot_token,
//!     &["TELEGRAM_BOT_TOKEN"],
//!     None,
//! );
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_with_env_fallback, settings_path, SettingsManager};
pub use schema::{
    AdvancedSettings, ApprovalSettings, AskgateSettings, RelaySettings, ServerSettings,
    TelegramSettings,
};
