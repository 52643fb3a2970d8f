use crate::errors::{AppError, Result};
use std::fmt;
use std::str::FromStr;

/// 32-byte Moolah market identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarketId(pub [u8; 32]);

impl MarketId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for MarketId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let hex_part = s.trim();
        let hex_part = hex_part.strip_prefix("0x").unwrap_or(hex_part);
        let bytes = ethers::utils::hex::decode(hex_part)
            .map_err(|e| AppError::Config(format!("market id is not valid hex: {e}")))?;
        let id: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            AppError::Config(format!("market id must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(id))
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", ethers::utils::hex::encode(self.0))
    }
}

impl fmt::Debug for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarketId({self})")
    }
}

/// The six `uint128` words returned by `Moolah.market(id)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketTotals {
    pub total_supply_assets: u128,
    pub total_supply_shares: u128,
    pub total_borrow_assets: u128,
    pub total_borrow_shares: u128,
    pub last_update: u128,
    pub fee: u128,
}

impl From<(u128, u128, u128, u128, u128, u128)> for MarketTotals {
    fn from(words: (u128, u128, u128, u128, u128, u128)) -> Self {
        Self {
            total_supply_assets: words.0,
            total_supply_shares: words.1,
            total_borrow_assets: words.2,
            total_borrow_shares: words.3,
            last_update: words.4,
            fee: words.5,
        }
    }
}

/// Supply and borrow assets taken from a single `market` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub supply_raw: u128,
    pub borrow_raw: u128,
}

impl From<MarketTotals> for MarketSnapshot {
    fn from(totals: MarketTotals) -> Self {
        Self {
            supply_raw: totals.total_supply_assets,
            borrow_raw: totals.total_borrow_assets,
        }
    }
}
