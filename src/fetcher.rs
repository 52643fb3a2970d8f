//! Market snapshot reads with retry.

use crate::chain::{MarketId, MarketSnapshot, MarketSource};
use crate::clock::Clock;
use crate::errors::Result;
use crate::retry::{RetryPolicy, retry_with_backoff};
use std::sync::Arc;
use tracing::debug;

pub struct MarketStateFetcher {
    source: Arc<dyn MarketSource>,
    market_id: MarketId,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl MarketStateFetcher {
    pub fn new(
        source: Arc<dyn MarketSource>,
        market_id: MarketId,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            market_id,
            policy,
            clock,
        }
    }

    pub fn market_id(&self) -> MarketId {
        self.market_id
    }

    /// Read supply and borrow assets for the configured market.
    ///
    /// Errors are only returned once the retry budget is spent.
    pub async fn fetch(&self) -> Result<MarketSnapshot> {
        let totals = retry_with_backoff("market_state", &self.policy, self.clock.as_ref(), || {
            self.source.market_totals(self.market_id)
        })
        .await?;
        let snapshot = MarketSnapshot::from(totals);
        debug!(
            supply_raw = snapshot.supply_raw,
            borrow_raw = snapshot.borrow_raw,
            "[FETCH] market snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMarketSource, ManualClock, market_id};
    use std::time::Duration;

    fn fetcher(source: Arc<FakeMarketSource>, clock: Arc<ManualClock>) -> MarketStateFetcher {
        MarketStateFetcher::new(source, market_id(), RetryPolicy::MARKET_FETCH, clock)
    }

    #[tokio::test]
    async fn returns_supply_and_borrow_from_one_read() {
        let source = Arc::new(FakeMarketSource::default());
        source.push_totals(500, 120);
        let clock = Arc::new(ManualClock::default());

        let snap = fetcher(source.clone(), clock.clone()).fetch().await.unwrap();
        assert_eq!(snap, MarketSnapshot { supply_raw: 500, borrow_raw: 120 });
        assert_eq!(source.market_calls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn retries_transient_rpc_errors() {
        let source = Arc::new(FakeMarketSource::default());
        source.push_error("timeout");
        source.push_totals(10, 1);
        let clock = Arc::new(ManualClock::default());

        let snap = fetcher(source.clone(), clock.clone()).fetch().await.unwrap();
        assert_eq!(snap.supply_raw, 10);
        assert_eq!(source.market_calls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn propagates_after_three_failures() {
        let source = Arc::new(FakeMarketSource::default());
        for _ in 0..3 {
            source.push_error("rpc down");
        }
        let clock = Arc::new(ManualClock::default());

        let err = fetcher(source.clone(), clock.clone()).fetch().await.unwrap_err();
        assert!(err.to_string().contains("rpc down"));
        assert_eq!(source.market_calls(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }
}
