//! Core library for the liquidity-monitor project.
//!
//! Polls a Moolah lending market, converts its supply and borrow totals into
//! available loan-token liquidity, and reports over Telegram: an hourly
//! heartbeat plus an alert whenever liquidity rises to the threshold.

pub mod chain;
pub mod clock;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod monitor;
pub mod notify;
pub mod retry;
pub mod units;
pub mod utils;

#[cfg(test)]
mod testing;
