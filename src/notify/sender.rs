use crate::clock::Clock;
use crate::notify::Notifier;
use crate::retry::{RetryPolicy, retry_with_backoff};
use std::fmt;
use std::sync::Arc;

/// Final result of one notification after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The destination answered but refused the message.
    Rejected { reason: Option<String> },
    /// Every attempt failed at the transport level.
    Failed { error: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Delivered => write!(f, "delivered"),
            Delivery::Rejected { reason: Some(r) } => write!(f, "rejected: {r}"),
            Delivery::Rejected { reason: None } => write!(f, "rejected"),
            Delivery::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

/// Sends through a [`Notifier`], retrying transport errors. Never fails.
pub struct NotificationSender {
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl NotificationSender {
    pub fn new(notifier: Arc<dyn Notifier>, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifier,
            policy,
            clock,
        }
    }

    pub async fn send(&self, text: &str) -> Delivery {
        let sent = retry_with_backoff("send_message", &self.policy, self.clock.as_ref(), || {
            self.notifier.send_message(text)
        })
        .await;
        match sent {
            Ok(true) => Delivery::Delivered,
            Ok(false) => Delivery::Rejected {
                reason: self.notifier.last_error(),
            },
            Err(e) => Delivery::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNotifier, ManualClock, SendResult};
    use std::time::Duration;

    fn sender(notifier: Arc<FakeNotifier>, clock: Arc<ManualClock>) -> NotificationSender {
        NotificationSender::new(notifier, RetryPolicy::NOTIFICATION, clock)
    }

    #[tokio::test]
    async fn delivered_on_first_try() {
        let notifier = Arc::new(FakeNotifier::default());
        let clock = Arc::new(ManualClock::default());

        let out = sender(notifier.clone(), clock.clone()).send("<b>hello</b>").await;
        assert_eq!(out, Delivery::Delivered);
        assert_eq!(notifier.sent(), vec!["<b>hello</b>".to_string()]);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn refusal_is_not_retried_and_reports_last_error() {
        let notifier = Arc::new(FakeNotifier::default());
        notifier.script([SendResult::Refused("chat not found")]);
        let clock = Arc::new(ManualClock::default());

        let out = sender(notifier.clone(), clock.clone()).send("x").await;
        assert_eq!(
            out,
            Delivery::Rejected {
                reason: Some("chat not found".into())
            }
        );
        assert_eq!(notifier.attempts(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn transport_errors_are_retried_then_succeed() {
        let notifier = Arc::new(FakeNotifier::default());
        notifier.script([SendResult::Transport("connection reset")]);
        let clock = Arc::new(ManualClock::default());

        let out = sender(notifier.clone(), clock.clone()).send("x").await;
        assert!(out.is_delivered());
        assert_eq!(notifier.attempts(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn exhausted_transport_errors_become_failed() {
        let notifier = Arc::new(FakeNotifier::default());
        notifier.script([
            SendResult::Transport("dns"),
            SendResult::Transport("dns"),
            SendResult::Transport("dns"),
        ]);
        let clock = Arc::new(ManualClock::default());

        let out = sender(notifier.clone(), clock.clone()).send("x").await;
        assert!(matches!(out, Delivery::Failed { ref error } if error.contains("dns")));
        assert_eq!(notifier.attempts(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }
}
