use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers_core::types::Log;
use ethers_providers::{Middleware, Provider, Ws};
use futures_util::{pin_mut, Stream, StreamExt};
use tracing::{info, warn};

use crate::alert::{AlertCoordinator, AlertSettings};
use crate::chain::{decode_transfer, transfer_filter, EthersVault, VaultReader};
use crate::config::WatchConfig;
use crate::ingestor::{EventIngestor, IngestRules};
use crate::notifier::MessageSink;
use crate::poller::{PollLoop, PollSettings};
use crate::utils::{mask_url, to_human};

pub struct Watchtower {
    config: WatchConfig,
    notifier: Arc<dyn MessageSink>,
}

impl Watchtower {
    pub fn new(config: WatchConfig, notifier: Arc<dyn MessageSink>) -> Self {
        Self { config, notifier }
    }

    /// Runs until a one-shot alert completes. Continuous mode watches forever
    /// once connected.
    pub async fn run(&self) -> Result<()> {
        let config = &self.config;
        info!("🔌 Connecting to blockchain: {}", mask_url(&config.ws_rpc_url));
        let provider = Arc::new(
            Provider::<Ws>::connect(&config.ws_rpc_url)
                .await
                .context("could not connect to RPC endpoint")?,
        );

        info!("🏦 Vault:  {:#x}", config.vault);
        match config.market {
            Some(market) => info!("🏪 Market: {:#x}", market),
            None => info!("🏪 Market: not configured"),
        }
        info!(
            "🎯 Target: {} USDC, ignoring transfers <= {} USDC",
            to_human(config.target_amount, config.asset_decimals),
            to_human(config.min_transfer_amount, config.asset_decimals)
        );
        if config.depositor.is_none() {
            warn!("⚠️  DEPOSITOR not set - only the raw vault balance will be checked");
        }

        let alerts = AlertCoordinator::new(AlertSettings::from_config(config), self.notifier.clone());
        let reader: Arc<dyn VaultReader> =
            Arc::new(EthersVault::new(provider.clone(), config.vault, config.token));
        let poller = PollLoop::new(PollSettings::from_config(config), reader, alerts.clone());
        let ingestor = EventIngestor::new(
            IngestRules::from_config(config),
            alerts.clone(),
            self.notifier.clone(),
        );

        let filter = transfer_filter(config.token)?;
        let subscription = async {
            match provider.subscribe_logs(&filter).await {
                Ok(stream) => {
                    info!("✅ Connected! Listening for {:#x} transfers...", config.token);
                    ingest_stream(stream, &ingestor).await;
                }
                Err(e) => warn!("⚠️  Transfer subscription unavailable, polling only: {}", e),
            }
        };

        supervise(&alerts, &poller, subscription).await;
        info!("👋 Watch finished");
        Ok(())
    }
}

/// Feeds decoded transfers to the ingestor until the stream ends.
pub async fn ingest_stream<S>(stream: S, ingestor: &EventIngestor)
where
    S: Stream<Item = Log>,
{
    pin_mut!(stream);
    while let Some(log) = stream.next().await {
        match decode_transfer(&log) {
            Some(event) => ingestor.handle(event).await,
            None => warn!("⚠️  Skipping undecodable Transfer log: {:?}", log.transaction_hash),
        }
    }
    warn!("⚠️  Transfer subscription closed, continuing with polling only");
}

/// Runs the poll loop next to `subscription` and returns once a one-shot alert
/// went out or the poll loop stopped. A finished subscription alone does not
/// end the watch.
pub async fn supervise<F>(alerts: &AlertCoordinator, poller: &PollLoop, subscription: F)
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = alerts.wait_finished() => {}
        _ = poller.run() => {}
        _ = async {
            subscription.await;
            std::future::pending::<()>().await
        } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{ingest_stream, supervise};
    use crate::alert::{AlertCoordinator, AlertSettings};
    use crate::chain::tests::transfer_log;
    use crate::evaluator::tests::FakeVault;
    use crate::ingestor::{EventIngestor, IngestRules};
    use crate::notifier::tests::RecordingSink;
    use crate::poller::{PollLoop, PollSettings};
    use ethers_core::types::{Address, Log, U256};
    use futures_util::stream;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn vault() -> Address {
        Address::repeat_byte(0x11)
    }

    struct Harness {
        alerts: AlertCoordinator,
        poller: PollLoop,
        ingestor: EventIngestor,
        reader: Arc<FakeVault>,
        sink: Arc<RecordingSink>,
    }

    fn harness(reader: FakeVault, one_shot: bool) -> Harness {
        let reader = Arc::new(reader);
        let sink = Arc::new(RecordingSink::default());
        let alerts = AlertCoordinator::new(
            AlertSettings {
                debounce_window: Duration::from_secs(2),
                reminder_interval: Duration::from_secs(10),
                reminder_cap: 5,
                one_shot,
                vault: vault(),
                market: None,
            },
            sink.clone(),
        );
        let poller = PollLoop::new(
            PollSettings {
                interval: Duration::from_secs(3600),
                vault: vault(),
                depositor: Some(Address::repeat_byte(0x22)),
                target: U256::from(8_000_000_000u64),
                decimals: 6,
                one_shot,
            },
            reader.clone(),
            alerts.clone(),
        );
        let ingestor = EventIngestor::new(
            IngestRules {
                vault: vault(),
                market: None,
                watch_wallet: None,
                min_transfer_amount: U256::from(10_000_000u64),
                decimals: 6,
            },
            alerts.clone(),
            sink.clone(),
        );
        Harness {
            alerts,
            poller,
            ingestor,
            reader,
            sink,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_transfer_ends_the_watch() {
        // vault stays empty, so only the pushed transfer can finish the run
        let h = harness(FakeVault::new(None, Some(0)), true);
        let logs = vec![transfer_log(Address::repeat_byte(0xaa), vault(), U256::from(20_000_000u64))];

        timeout(
            Duration::from_secs(1),
            supervise(&h.alerts, &h.poller, ingest_stream(stream::iter(logs), &h.ingestor)),
        )
        .await
        .expect("one-shot watch should return");

        assert!(h.alerts.is_finished());
        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("_Transfer Detected_"));
        assert!(messages[0].contains("Trigger: Transfer event"));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_outlives_a_closed_subscription() {
        let h = harness(FakeVault::new(None, Some(0)), false);
        let logs: Vec<Log> = Vec::new();

        let outcome = timeout(
            Duration::from_secs(3 * 3600 + 1),
            supervise(&h.alerts, &h.poller, ingest_stream(stream::iter(logs), &h.ingestor)),
        )
        .await;

        assert!(outcome.is_err(), "watch must keep running after the stream ends");
        assert_eq!(h.reader.balance_reads.load(Ordering::SeqCst), 4);
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_logs_are_skipped() {
        let h = harness(FakeVault::new(None, Some(0)), false);
        let logs = vec![
            Log::default(),
            transfer_log(Address::repeat_byte(0xaa), vault(), U256::from(20_000_000u64)),
        ];

        ingest_stream(stream::iter(logs), &h.ingestor).await;

        assert_eq!(h.sink.messages().len(), 1);
        assert!(h.alerts.snapshot().await.alerted);
        h.alerts.cancel_reminders().await;
    }
}
