use chrono::{DateTime, Utc};
use std::time::Duration;

/// Trigger history carried between polling cycles. Lost on restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    /// `is_above` from the last evaluated cycle.
    pub last_above: bool,
    /// When the last heartbeat was attempted; `None` until the first one.
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heartbeat_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.last_heartbeat {
            None => true,
            // a negative elapsed time (clock stepped back) converts to Err
            Some(last) => (now - last).to_std().is_ok_and(|elapsed| elapsed >= interval),
        }
    }

    pub fn mark_heartbeat(&mut self, now: DateTime<Utc>) {
        self.last_heartbeat = Some(now);
    }

    /// True only on a below -> at-or-above transition.
    pub fn is_rising_edge(&self, is_above: bool) -> bool {
        is_above && !self.last_above
    }

    pub fn record_level(&mut self, is_above: bool) {
        self.last_above = is_above;
    }
}
