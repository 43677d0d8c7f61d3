use std::sync::Arc;

use ethers_core::types::{Address, U256};
use tracing::{info, trace, warn};

use crate::alert::AlertCoordinator;
use crate::config::WatchConfig;
use crate::domain::{TransferDetails, TransferEvent};
use crate::messages;
use crate::notifier::MessageSink;
use crate::utils::to_human;

#[derive(Debug, Clone)]
pub struct IngestRules {
    pub vault: Address,
    pub market: Option<Address>,
    pub watch_wallet: Option<Address>,
    pub min_transfer_amount: U256,
    pub decimals: u8,
}

impl IngestRules {
    pub fn from_config(config: &WatchConfig) -> Self {
        Self {
            vault: config.vault,
            market: config.market,
            watch_wallet: config.watch_wallet,
            min_transfer_amount: config.min_transfer_amount,
            decimals: config.asset_decimals,
        }
    }
}

/// What a single transfer should produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routing {
    /// Alert text plus details for the coordinator.
    pub alert: Option<(String, TransferDetails)>,
    /// Plain notice for the watched wallet, sent straight to the sink.
    pub wallet_notice: Option<String>,
}

impl Routing {
    pub fn is_empty(&self) -> bool {
        self.alert.is_none() && self.wallet_notice.is_none()
    }
}

/// Classifies a transfer. The market destination takes priority over the vault,
/// and the watched-wallet notice is independent of both.
pub fn route(rules: &IngestRules, event: &TransferEvent) -> Routing {
    let mut routing = Routing::default();

    if event.amount <= rules.min_transfer_amount {
        return routing;
    }

    let human = to_human(event.amount, rules.decimals);

    let destination = match rules.market {
        Some(market) if event.to == market => Some(("Market Contract", market)),
        _ if event.to == rules.vault => Some(("Vault", rules.vault)),
        _ => None,
    };

    if let Some((label, to)) = destination {
        let details = TransferDetails {
            amount: human.clone(),
            from: event.from,
            to,
        };
        routing.alert = Some((messages::transfer_alert(label, &details, event.source), details));
    }

    if let Some(wallet) = rules.watch_wallet {
        if event.from == wallet {
            routing.wallet_notice = Some(messages::wallet_activity(wallet, &human, event.from));
        }
    }

    routing
}

pub struct EventIngestor {
    rules: IngestRules,
    alerts: AlertCoordinator,
    sink: Arc<dyn MessageSink>,
}

impl EventIngestor {
    pub fn new(rules: IngestRules, alerts: AlertCoordinator, sink: Arc<dyn MessageSink>) -> Self {
        Self { rules, alerts, sink }
    }

    pub async fn handle(&self, event: TransferEvent) {
        let routing = route(&self.rules, &event);
        if routing.is_empty() {
            trace!("Ignoring transfer {:#x} -> {:#x}", event.from, event.to);
            return;
        }

        if let Some((text, details)) = routing.alert {
            info!(
                "💸 Transfer from {:#x} -> {:#x} ({} USDC, via {})",
                details.from, details.to, details.amount, event.source
            );
            self.alerts.notify(&text, Some(details)).await;
        }

        if let Some(notice) = routing.wallet_notice {
            info!("👛 Watched wallet moved funds");
            if let Err(e) = self.sink.send(&notice).await {
                warn!("⚠️  Wallet notice delivery failed: {e:#}");
            }
        }
    }
}
