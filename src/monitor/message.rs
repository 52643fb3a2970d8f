//! Telegram message bodies (HTML parse mode).

use crate::units::format_amount;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Utc};

/// `YYYY-MM-DD HH:MM:SS` in the report timezone.
pub fn report_time(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn heartbeat(loan_symbol: &str, available: &BigDecimal, time: &str) -> String {
    let loan = escape_html(loan_symbol);
    format!(
        "🫀 <b>{loan} Monitor Alive</b>\n\n\
         • Available to borrow: {} {loan}\n\
         • Time: {time}",
        format_amount(available, 2),
    )
}

pub fn threshold_alert(
    loan_symbol: &str,
    collateral_symbol: &str,
    available: &BigDecimal,
    threshold: &BigDecimal,
    time: &str,
) -> String {
    let loan = escape_html(loan_symbol);
    format!(
        "✅ <b>{loan} borrowable liquidity triggered</b>\n\n\
         • Collateral: {}\n\
         • Available {loan}: <b>{}</b>\n\
         • Threshold: {}\n\
         • Time: {time}",
        escape_html(collateral_symbol),
        format_amount(available, 2),
        format_amount(threshold, 0),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
