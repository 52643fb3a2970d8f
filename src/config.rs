//! Configuration loader and application settings.

use crate::chain::MarketId;
use crate::errors::{AppError, Result};
use crate::monitor::MonitorSettings;
use crate::notify::TelegramConfig;
use crate::notify::telegram::TELEGRAM_API_URL;
use bigdecimal::BigDecimal;
use chrono::FixedOffset;
use ethers::types::Address;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_RPC_URL: &str = "https://bsc-dataseed.binance.org/";
const DEFAULT_MOOLAH: &str = "0x8F73b65B4caAf64FBA2aF91cC5D4a2A1318E5D8C";
const DEFAULT_LOAN_TOKEN: &str = "0x8d0D000Ee44948FC98c9B98A4FA4921476f08B0d"; // USD1
const DEFAULT_COLLATERAL_TOKEN: &str = "0x5A110fC00474038f6c02E89C707D638602EA44B5"; // USDF
const DEFAULT_MARKET_ID: &str = "b060b526bd2fc99150cff9d6f7e7fab88d5d67e35cf262215f986d62a2fba99e";

/// Consolidated application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP JSON-RPC endpoint of a BSC node.
    pub rpc_url: String,
    /// Moolah lending contract.
    pub moolah_address: Address,
    /// Token borrowed from the market; its decimals scale all amounts.
    pub loan_token: Address,
    pub collateral_token: Address,
    pub market_id: MarketId,
    pub loan_symbol: String,
    pub collateral_symbol: String,
    /// Alert when available liquidity reaches this many loan tokens.
    pub threshold: BigDecimal,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub report_offset: FixedOffset,
    pub telegram: TelegramConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| get(key).ok_or_else(|| AppError::Config(format!("Set {key} env var")));

        let rpc_url = or_default("RPC_URL", DEFAULT_RPC_URL);
        let moolah_address = parse_address("MOOLAH_ADDRESS", &or_default("MOOLAH_ADDRESS", DEFAULT_MOOLAH))?;
        let loan_token = parse_address(
            "LOAN_TOKEN_ADDRESS",
            &or_default("LOAN_TOKEN_ADDRESS", DEFAULT_LOAN_TOKEN),
        )?;
        let collateral_token = parse_address(
            "COLLATERAL_TOKEN_ADDRESS",
            &or_default("COLLATERAL_TOKEN_ADDRESS", DEFAULT_COLLATERAL_TOKEN),
        )?;
        let market_id = MarketId::from_str(&or_default("MARKET_ID", DEFAULT_MARKET_ID))?;

        let threshold = BigDecimal::from_str(&or_default("THRESHOLD", "10000"))?;
        let poll_interval = parse_secs("POLL_INTERVAL_SECS", &or_default("POLL_INTERVAL_SECS", "60"))?;
        let heartbeat_interval = parse_secs(
            "HEARTBEAT_INTERVAL_SECS",
            &or_default("HEARTBEAT_INTERVAL_SECS", "3600"),
        )?;

        let offset_hours: i32 = or_default("REPORT_UTC_OFFSET_HOURS", "8")
            .parse()
            .map_err(|e| AppError::Config(format!("REPORT_UTC_OFFSET_HOURS: {e}")))?;
        let report_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!("REPORT_UTC_OFFSET_HOURS out of range: {offset_hours}"))
            })?;

        let telegram = TelegramConfig {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            chat_id: required("TELEGRAM_GROUP")?,
            api_url: Url::parse(&or_default("TELEGRAM_API_URL", TELEGRAM_API_URL))?,
        };

        Ok(Self {
            rpc_url,
            moolah_address,
            loan_token,
            collateral_token,
            market_id,
            loan_symbol: or_default("LOAN_SYMBOL", "USD1"),
            collateral_symbol: or_default("COLLATERAL_SYMBOL", "USDF"),
            threshold,
            poll_interval,
            heartbeat_interval,
            report_offset,
            telegram,
        })
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            threshold: self.threshold.clone(),
            poll_interval: self.poll_interval,
            heartbeat_interval: self.heartbeat_interval,
            loan_symbol: self.loan_symbol.clone(),
            collateral_symbol: self.collateral_symbol.clone(),
            report_offset: self.report_offset,
        }
    }
}

fn parse_address(key: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw).map_err(|e| AppError::Config(format!("{key} is not an address: {e}")))
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be whole seconds: {e}")))?;
    if secs == 0 {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}
