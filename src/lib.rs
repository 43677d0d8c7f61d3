pub mod alert;
pub mod chain;
pub mod config;
pub mod domain;
pub mod evaluator;
pub mod ingestor;
pub mod messages;
pub mod notifier;
pub mod poller;
pub mod utils;
pub mod watcher;

use std::sync::Arc;

use config::WatchConfig;
use notifier::{ConsoleNotifier, NotifierHub, TelegramNotifier};
use watcher::Watchtower;

use anyhow::Result;
use tracing::{info, warn};

pub async fn run() -> Result<()> {
    let config = WatchConfig::from_env()?;

    let console = ConsoleNotifier::new();
    let telegram = TelegramNotifier::maybe_from_config(&config);
    if telegram.is_some() {
        info!("📱 Telegram notifications enabled");
    } else {
        warn!("📱 TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set - alerts go to the console only");
    }
    let notifier = Arc::new(NotifierHub::new(console, telegram));

    let app = Watchtower::new(config, notifier);
    app.run().await
}
