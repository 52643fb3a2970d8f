//! On-chain market reads.

use crate::errors::Result;
use async_trait::async_trait;
use ethers::types::Address;

pub mod client;
pub mod state;

pub use client::MoolahClient;
pub use state::{MarketId, MarketSnapshot, MarketTotals};

/// Chain data accessor consumed by the monitor.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Aggregate supply/borrow words for one market, from a single call.
    async fn market_totals(&self, market_id: MarketId) -> Result<MarketTotals>;

    /// ERC-20 `decimals()` of `token`.
    async fn token_decimals(&self, token: Address) -> Result<u8>;
}
