//! Outbound notifications.
//!
//! Responsibilities:
//! • Deliver formatted text to the configured chat (Telegram).
//! • Retry transport failures without ever failing the caller.

use crate::errors::Result;
use async_trait::async_trait;

pub mod sender;
pub mod telegram;

pub use sender::{Delivery, NotificationSender};
pub use telegram::{TelegramConfig, TelegramNotifier};

/// Notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` (simple HTML markup allowed). `Ok(false)` means the
    /// destination refused the message; `Err` means the transport failed.
    async fn send_message(&self, text: &str) -> Result<bool>;

    /// Reason for the most recent refused or failed send, if any.
    fn last_error(&self) -> Option<String>;
}
