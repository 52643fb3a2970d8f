//! Fixed-point chain integers to human decimal units.

use crate::chain::MarketSource;
use crate::errors::Result;
use bigdecimal::{BigDecimal, RoundingMode};
use ethers::types::Address;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use tracing::info;

/// Converts raw token amounts using the token's `decimals()`, fetched once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitConverter {
    decimals: u8,
}

impl UnitConverter {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// Query the token's decimals. Not retried: without the scale factor the
    /// monitor cannot start.
    pub async fn load(source: &dyn MarketSource, token: Address) -> Result<Self> {
        let decimals = source.token_decimals(token).await?;
        info!(?token, decimals, "[INIT] token decimals loaded");
        Ok(Self::new(decimals))
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// `raw / 10^decimals`, exact.
    pub fn humanize(&self, raw: u128) -> BigDecimal {
        BigDecimal::new(BigInt::from(raw), i64::from(self.decimals))
    }

    /// Inverse of [`humanize`](Self::humanize). Digits beyond `decimals` are
    /// truncated; negative or oversized amounts give `None`.
    pub fn to_raw(&self, amount: &BigDecimal) -> Option<u128> {
        if amount.is_negative() {
            return None;
        }
        let scaled = amount * BigDecimal::new(BigInt::from(1), -i64::from(self.decimals));
        let (int_val, _) = scaled.with_scale(0).into_bigint_and_exponent();
        int_val.to_u128()
    }
}

/// Render `value` with `places` fractional digits and `,` thousands separators.
pub fn format_amount(value: &BigDecimal, places: u32) -> String {
    let rounded = value.with_scale_round(i64::from(places), RoundingMode::HalfEven);
    let (int_val, _) = rounded.into_bigint_and_exponent();
    let negative = int_val.is_negative();
    let digits = int_val.abs().to_string();

    let places = places as usize;
    let padded = if digits.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - places);

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}
