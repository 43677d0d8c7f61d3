use std::sync::Arc;
use std::time::Duration;

use ethers_core::types::Address;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::domain::TransferDetails;
use crate::messages;
use crate::notifier::MessageSink;

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub debounce_window: Duration,
    pub reminder_interval: Duration,
    pub reminder_cap: u32,
    pub one_shot: bool,
    pub vault: Address,
    pub market: Option<Address>,
}

impl AlertSettings {
    pub fn from_config(config: &WatchConfig) -> Self {
        Self {
            debounce_window: config.debounce_window,
            reminder_interval: config.reminder_interval,
            reminder_cap: config.reminder_cap,
            one_shot: config.one_shot,
            vault: config.vault,
            market: config.market,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Dropped by the debounce guard.
    Suppressed,
    Dispatched,
    /// One-shot mode delivered its alert; the watcher should exit.
    Finished,
}

/// Read-only copy of the coordinator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSnapshot {
    pub alerted: bool,
    pub reminder_active: bool,
    pub reminder_count: u32,
    pub last_transfer: Option<TransferDetails>,
}

/// Mutable alert state. Fields change only through the methods below, each of
/// which completes its transition before the caller awaits any I/O.
#[derive(Debug, Default)]
struct AlertState {
    alerted: bool,
    last_alert_at: Option<Instant>,
    reminder: Option<JoinHandle<()>>,
    reminder_count: u32,
    last_transfer: Option<TransferDetails>,
}

impl AlertState {
    fn is_debounced(&self, now: Instant, window: Duration) -> bool {
        self.alerted
            && self
                .last_alert_at
                .map(|at| now.saturating_duration_since(at) < window)
                .unwrap_or(false)
    }

    fn record_alert(&mut self, now: Instant, details: Option<TransferDetails>) {
        self.last_alert_at = Some(now);
        self.alerted = true;
        if let Some(details) = details {
            self.last_transfer = Some(details);
        }
    }

    /// Advances the reminder counter. Returns the new count and whether it is
    /// the final reminder, or `None` when the cap was already reached. The
    /// handle is released in the same step that ends the cycle.
    fn next_reminder(&mut self, cap: u32) -> Option<(u32, bool)> {
        if self.reminder_count >= cap {
            self.reminder = None;
            return None;
        }
        self.reminder_count += 1;
        let last = self.reminder_count >= cap;
        if last {
            self.reminder = None;
        }
        Some((self.reminder_count, last))
    }

    fn cancel_reminders(&mut self) -> bool {
        match self.reminder.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            alerted: self.alerted,
            reminder_active: self.reminder.is_some(),
            reminder_count: self.reminder_count,
            last_transfer: self.last_transfer.clone(),
        }
    }
}

struct Inner {
    settings: AlertSettings,
    sink: Arc<dyn MessageSink>,
    state: Mutex<AlertState>,
    finished: watch::Sender<bool>,
}

impl Inner {
    async fn dispatch(&self, text: &str) {
        if let Err(e) = self.sink.send(text).await {
            warn!("⚠️  Alert delivery failed: {e:#}");
        }
    }
}

/// Gates alert delivery for both the push and the poll path: debounces
/// near-simultaneous triggers, runs a capped reminder cycle once alerted, and
/// signals completion in one-shot mode.
#[derive(Clone)]
pub struct AlertCoordinator {
    inner: Arc<Inner>,
}

impl AlertCoordinator {
    pub fn new(settings: AlertSettings, sink: Arc<dyn MessageSink>) -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                settings,
                sink,
                state: Mutex::new(AlertState::default()),
                finished,
            }),
        }
    }

    pub async fn notify(&self, message: &str, details: Option<TransferDetails>) -> NotifyOutcome {
        let now = Instant::now();
        {
            let mut state = self.inner.state.lock().await;
            if state.is_debounced(now, self.inner.settings.debounce_window) {
                debug!("Alert suppressed: another alert went out moments ago");
                return NotifyOutcome::Suppressed;
            }
            state.record_alert(now, details);
        }

        self.inner.dispatch(message).await;

        if self.inner.settings.one_shot {
            info!("🏁 ONE_SHOT set -> finishing after first alert");
            self.inner.finished.send_replace(true);
            return NotifyOutcome::Finished;
        }

        let mut state = self.inner.state.lock().await;
        if state.reminder.is_none() {
            state.reminder_count = 0;
            state.reminder = Some(spawn_reminders(Arc::clone(&self.inner)));
        }
        NotifyOutcome::Dispatched
    }

    /// Stops the reminder cycle. Safe to call repeatedly.
    pub async fn cancel_reminders(&self) {
        if self.inner.state.lock().await.cancel_reminders() {
            info!("🔕 Reminder cycle cancelled");
        }
    }

    pub async fn snapshot(&self) -> AlertSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        *self.inner.finished.borrow()
    }

    /// Resolves once a one-shot alert has been delivered.
    pub async fn wait_finished(&self) {
        let mut finished = self.inner.finished.subscribe();
        if finished.wait_for(|done| *done).await.is_err() {
            // sender lives as long as `self`
            std::future::pending::<()>().await;
        }
    }
}

fn spawn_reminders(inner: Arc<Inner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = inner.settings.reminder_interval;
        let cap = inner.settings.reminder_cap;
        let mut ticker = interval_at(Instant::now() + period, period);
        // a stalled send must not release the missed ticks as a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let (text, count, last) = {
                let mut state = inner.state.lock().await;
                let Some((count, last)) = state.next_reminder(cap) else {
                    info!("Reached max reminder count ({cap}), stopping reminders");
                    return;
                };
                let text = messages::reminder(
                    state.last_transfer.as_ref(),
                    inner.settings.vault,
                    inner.settings.market,
                );
                (text, count, last)
            };

            info!("⏰ Reminder {count}/{cap}");
            inner.dispatch(&text).await;

            if last {
                info!("Reached max reminder count ({cap}), stopping reminders");
                return;
            }
        }
    })
}
