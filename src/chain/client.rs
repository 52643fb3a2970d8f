use crate::chain::{MarketId, MarketSource, MarketTotals};
use crate::errors::Result;
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    providers::{Http, Middleware, Provider},
    types::Address,
};
use std::sync::Arc;
use tracing::info;

abigen!(
    Moolah,
    r"[
        function market(bytes32 id) view returns (uint128, uint128, uint128, uint128, uint128, uint128)
    ]",
);

abigen!(
    Erc20,
    r"[
        function decimals() view returns (uint8)
    ]",
);

/// Read-only handle on a Moolah lending contract over HTTP JSON-RPC.
#[derive(Clone)]
pub struct MoolahClient {
    provider: Arc<Provider<Http>>,
    moolah: Moolah<Provider<Http>>,
}

impl MoolahClient {
    /// Build the provider and check the node answers before the loop starts.
    pub async fn connect(rpc_url: &str, moolah_addr: Address) -> Result<Self> {
        let provider = Arc::new(Provider::<Http>::try_from(rpc_url)?);
        let chain_id = provider.get_chainid().await?; // sanity-check
        info!(%chain_id, ?moolah_addr, "[INIT] RPC connected");
        let moolah = Moolah::new(moolah_addr, provider.clone());
        Ok(Self { provider, moolah })
    }
}

#[async_trait]
impl MarketSource for MoolahClient {
    async fn market_totals(&self, market_id: MarketId) -> Result<MarketTotals> {
        let words = self.moolah.market(market_id.0).call().await?;
        Ok(MarketTotals::from(words))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let erc20 = Erc20::new(token, self.provider.clone());
        Ok(erc20.decimals().call().await?)
    }
}
