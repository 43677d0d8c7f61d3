mod console;
mod telegram;

pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Outbound text channel. Delivery is at-most-once; callers log failures.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub struct NotifierHub {
    console: ConsoleNotifier,
    telegram: Option<TelegramNotifier>,
}

impl NotifierHub {
    pub fn new(console: ConsoleNotifier, telegram: Option<TelegramNotifier>) -> Self {
        Self { console, telegram }
    }
}

#[async_trait]
impl MessageSink for NotifierHub {
    async fn send(&self, text: &str) -> Result<()> {
        self.console.send(text).await?;

        if let Some(telegram) = &self.telegram {
            if let Err(e) = telegram.send(text).await {
                warn!("Telegram notification failed: {}", e);
            }
        }

        Ok(())
    }
}
