// Liquidity Watchtower - Vault Liquidity Monitor
// Watches a lending vault for withdrawable USDC and sends Telegram alerts

use std::process::ExitCode;

use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    match dotenv::dotenv() {
        Ok(path) => info!("📄 Loaded .env from {:?}", path),
        Err(e) => warn!("⚠️  Could not load .env file: {}", e),
    }

    info!("🏗️  Starting Liquidity Watchtower");

    match liquidity_watchtower::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}
