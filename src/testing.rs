//! In-memory collaborators for unit tests.

use crate::chain::{MarketId, MarketSource, MarketTotals};
use crate::clock::Clock;
use crate::errors::{AppError, Result};
use crate::notify::Notifier;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ethers::types::Address;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

pub fn market_id() -> MarketId {
    MarketId([0xb0; 32])
}

/// Clock whose `sleep` returns immediately and advances `now`.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    }
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap();
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}

enum MarketReply {
    Totals(MarketTotals),
    Error(String),
    Panic(String),
}

/// Market source replaying queued results; an empty queue is an error.
#[derive(Default)]
pub struct FakeMarketSource {
    market: Mutex<VecDeque<MarketReply>>,
    market_calls: Mutex<usize>,
    decimals: Mutex<Option<std::result::Result<u8, String>>>,
    decimals_calls: Mutex<usize>,
}

impl FakeMarketSource {
    pub fn with_decimals(decimals: u8) -> Self {
        let source = Self::default();
        *source.decimals.lock() = Some(Ok(decimals));
        source
    }

    pub fn push_totals(&self, supply: u128, borrow: u128) {
        self.market.lock().push_back(MarketReply::Totals(MarketTotals {
            total_supply_assets: supply,
            total_borrow_assets: borrow,
            ..MarketTotals::default()
        }));
    }

    pub fn push_error(&self, message: &str) {
        self.market.lock().push_back(MarketReply::Error(message.to_string()));
    }

    /// The next read panics instead of returning.
    pub fn push_panic(&self, message: &str) {
        self.market.lock().push_back(MarketReply::Panic(message.to_string()));
    }

    pub fn fail_decimals(&self, message: &str) {
        *self.decimals.lock() = Some(Err(message.to_string()));
    }

    pub fn market_calls(&self) -> usize {
        *self.market_calls.lock()
    }

    pub fn decimals_calls(&self) -> usize {
        *self.decimals_calls.lock()
    }
}

#[async_trait]
impl MarketSource for FakeMarketSource {
    async fn market_totals(&self, _market_id: MarketId) -> Result<MarketTotals> {
        *self.market_calls.lock() += 1;
        let next = self.market.lock().pop_front();
        match next {
            Some(MarketReply::Totals(totals)) => Ok(totals),
            Some(MarketReply::Error(msg)) => Err(AppError::Other(msg)),
            Some(MarketReply::Panic(msg)) => panic!("{msg}"),
            None => Err(AppError::Other("no scripted market response".into())),
        }
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8> {
        *self.decimals_calls.lock() += 1;
        let scripted = self.decimals.lock().clone();
        match scripted {
            Some(Ok(d)) => Ok(d),
            Some(Err(msg)) => Err(AppError::Other(msg)),
            None => Ok(18),
        }
    }
}

/// Scripted outcome of one `send_message` call.
#[derive(Debug, Clone, Copy)]
pub enum SendResult {
    Ok,
    Refused(&'static str),
    Transport(&'static str),
}

/// Notifier replaying scripted outcomes; unscripted calls succeed.
#[derive(Default)]
pub struct FakeNotifier {
    script: Mutex<VecDeque<SendResult>>,
    sent: Mutex<Vec<String>>,
    attempts: Mutex<usize>,
    last_error: Mutex<Option<String>>,
}

impl FakeNotifier {
    pub fn script(&self, results: impl IntoIterator<Item = SendResult>) {
        self.script.lock().extend(results);
    }

    /// Messages that were accepted.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_message(&self, text: &str) -> Result<bool> {
        *self.attempts.lock() += 1;
        let next = self.script.lock().pop_front().unwrap_or(SendResult::Ok);
        match next {
            SendResult::Ok => {
                self.sent.lock().push(text.to_string());
                *self.last_error.lock() = None;
                Ok(true)
            }
            SendResult::Refused(reason) => {
                *self.last_error.lock() = Some(reason.to_string());
                Ok(false)
            }
            SendResult::Transport(reason) => {
                *self.last_error.lock() = Some(reason.to_string());
                Err(AppError::Other(reason.to_string()))
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}
