//! askgate - Human-in-the-loop approval gateway
//!
//! Hook scripts POST approval questions; a human answers from Telegram.
//!
//! # Usage
//!
//! ```bash
//! # Serve with settings from ~/.askgate/settings.toml
//! TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... ./target/debug/askgate
//!
//! # Custom port and a 60 second approval timeout
//! ./target/debug/askgate --port 9000 --timeout-secs 60
//! ```

use anyhow::Result;
use clap::Parser;

use askgate_lib::cli::{initialize, run, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let ctx = initialize(&args).await?;

    run(ctx).await
}
