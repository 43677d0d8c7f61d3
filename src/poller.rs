use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use ethers_core::types::{Address, U256};
use tracing::{debug, info, warn};

use crate::alert::{AlertCoordinator, NotifyOutcome};
use crate::chain::VaultReader;
use crate::config::WatchConfig;
use crate::domain::TriggerSource;
use crate::evaluator::evaluate;
use crate::messages;
use crate::utils::to_human;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub vault: Address,
    pub depositor: Option<Address>,
    pub target: U256,
    pub decimals: u8,
    pub one_shot: bool,
}

impl PollSettings {
    pub fn from_config(config: &WatchConfig) -> Self {
        Self {
            interval: config.poll_interval,
            vault: config.vault,
            depositor: config.depositor,
            target: config.target_amount,
            decimals: config.asset_decimals,
            one_shot: config.one_shot,
        }
    }
}

/// Periodic backstop for missed or unavailable transfer events.
pub struct PollLoop {
    settings: PollSettings,
    reader: Arc<dyn VaultReader>,
    alerts: AlertCoordinator,
}

impl PollLoop {
    pub fn new(settings: PollSettings, reader: Arc<dyn VaultReader>, alerts: AlertCoordinator) -> Self {
        Self {
            settings,
            reader,
            alerts,
        }
    }

    /// Checks immediately, then once per interval. Returns only in one-shot mode
    /// after a hit.
    pub async fn run(&self) {
        info!("⏱️  Poll loop started. Interval: {:?}", self.settings.interval);
        loop {
            match self.tick().await {
                Ok(true) if self.settings.one_shot => {
                    info!("🏁 Threshold hit and ONE_SHOT requested -> stopping poll loop");
                    return;
                }
                Ok(_) => {}
                Err(e) => warn!("⚠️  Poll check failed: {e:#}"),
            }
            tokio::time::sleep(self.settings.interval).await;
        }
    }

    /// One evaluation. Returns whether the threshold was hit.
    pub async fn tick(&self) -> Result<bool> {
        let check = evaluate(
            self.reader.as_ref(),
            self.settings.depositor,
            self.settings.target,
            self.settings.decimals,
        )
        .await?;

        let decimals = self.settings.decimals;
        let balance = check
            .reading
            .vault_balance
            .map(|b| to_human(b, decimals))
            .unwrap_or_else(|| "-".to_string());
        debug!(
            "Liquidity reading: withdrawable {} USDC, vault balance {} USDC",
            to_human(check.reading.withdrawable, decimals),
            balance
        );

        if !check.hit {
            debug!(
                "No liquidity yet: {} USDC ({} check)",
                check.human_amount, check.mode
            );
            return Ok(false);
        }

        info!("💰 Liquidity threshold hit: {} USDC ({} check)", check.human_amount, check.mode);
        let text = messages::liquidity_alert(self.settings.vault, &check, TriggerSource::Poll);
        if self.alerts.notify(&text, None).await == NotifyOutcome::Suppressed {
            debug!("Poll alert folded into a recent alert");
        }
        Ok(true)
    }
}
