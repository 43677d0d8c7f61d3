use anyhow::Result;
use chrono::Utc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        println!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"), text);
        info!("Alert sent to console ({} chars)", text.len());
        Ok(())
    }
}
