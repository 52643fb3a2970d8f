//! Polling loop: heartbeat scheduling and rising-edge threshold alerts.

use crate::clock::Clock;
use crate::fetcher::MarketStateFetcher;
use crate::notify::{Delivery, NotificationSender};
use crate::units::{UnitConverter, format_amount};
use bigdecimal::BigDecimal;
use chrono::FixedOffset;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub mod message;
pub mod state;

pub use state::MonitorState;

/// Fixed parameters of the loop.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub threshold: BigDecimal,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub loan_symbol: String,
    pub collateral_symbol: String,
    /// Timezone used for timestamps in messages and cycle logs.
    pub report_offset: FixedOffset,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The market read failed after retries; nothing was evaluated.
    Skipped,
    Evaluated(Evaluation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub available: BigDecimal,
    pub is_above: bool,
    pub heartbeat: Option<Delivery>,
    pub alert: Option<Delivery>,
}

pub struct Monitor {
    fetcher: MarketStateFetcher,
    sender: NotificationSender,
    converter: UnitConverter,
    settings: MonitorSettings,
    clock: Arc<dyn Clock>,
    state: MonitorState,
}

impl Monitor {
    pub fn new(
        fetcher: MarketStateFetcher,
        sender: NotificationSender,
        converter: UnitConverter,
        settings: MonitorSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            sender,
            converter,
            settings,
            clock,
            state: MonitorState::new(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    fn timestamp(&self) -> String {
        message::report_time(self.clock.now(), self.settings.report_offset)
    }

    /// Run one polling cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        let snapshot = match self.fetcher.fetch().await {
            Ok(s) => s,
            Err(e) => {
                error!(at = %self.timestamp(), error = %e, "[FETCH] market read failed, skipping cycle");
                return TickOutcome::Skipped;
            }
        };

        // supply and borrow come from the same read
        let available =
            self.converter.humanize(snapshot.supply_raw) - self.converter.humanize(snapshot.borrow_raw);
        let now = self.clock.now();
        let ts = message::report_time(now, self.settings.report_offset);

        let heartbeat = if self.state.heartbeat_due(now, self.settings.heartbeat_interval) {
            let body = message::heartbeat(&self.settings.loan_symbol, &available, &ts);
            let delivery = self.sender.send(&body).await;
            if delivery.is_delivered() {
                info!(at = %ts, available = %format_amount(&available, 2), "[HEARTBEAT] sent");
            } else {
                warn!(at = %ts, outcome = %delivery, "[HEARTBEAT] not delivered");
            }
            // at most one attempt per interval, delivered or not
            self.state.mark_heartbeat(now);
            Some(delivery)
        } else {
            None
        };

        let is_above = available >= self.settings.threshold;
        let alert = if self.state.is_rising_edge(is_above) {
            let body = message::threshold_alert(
                &self.settings.loan_symbol,
                &self.settings.collateral_symbol,
                &available,
                &self.settings.threshold,
                &ts,
            );
            let delivery = self.sender.send(&body).await;
            match &delivery {
                Delivery::Delivered => info!(
                    at = %ts,
                    available = %format_amount(&available, 2),
                    symbol = %self.settings.loan_symbol,
                    "[ALERT] threshold alert sent"
                ),
                other => error!(at = %ts, outcome = %other, "[ALERT] threshold alert send failed"),
            }
            Some(delivery)
        } else {
            None
        };

        // updated even when the alert was not delivered
        self.state.record_level(is_above);

        TickOutcome::Evaluated(Evaluation {
            available,
            is_above,
            heartbeat,
            alert,
        })
    }

    /// Poll until `shutdown` resolves. A shutdown request lets the running
    /// tick finish and exits before the next sleep.
    pub async fn run<S>(&mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        info!(
            market = %self.fetcher.market_id(),
            threshold = %self.settings.threshold,
            poll_secs = self.settings.poll_interval.as_secs(),
            heartbeat_secs = self.settings.heartbeat_interval.as_secs(),
            "[LOOP] monitoring started"
        );
        tokio::pin!(shutdown);
        loop {
            if let Err(panic) = AssertUnwindSafe(self.tick()).catch_unwind().await {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                error!(at = %self.timestamp(), %reason, "[LOOP] cycle aborted");
            }

            let poll_interval = self.settings.poll_interval;
            let clock = self.clock.clone();
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("[LOOP] shutdown requested, exiting");
                    break;
                }
                _ = clock.sleep(poll_interval) => {}
            }
        }
    }
}
