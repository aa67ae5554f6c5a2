//! Match alerts. Delivery failures never abort a request: `deliver` turns every
//! outcome into a `NotificationOutcome` the caller reports back to the user.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, NotifierKind};
use crate::provider::ProviderError;

pub mod twilio;

pub use twilio::TwilioWhatsAppNotifier;

/// WhatsApp caps a message body at 1600 characters.
pub const MAX_MESSAGE_CHARS: usize = 1599;

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<DeliveryReceipt, ProviderError>;

    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when `NOTIFIER=disabled`. Never contacts anything.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _message: &str) -> Result<DeliveryReceipt, ProviderError> {
        Ok(DeliveryReceipt {
            message_id: String::new(),
        })
    }

    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// What happened to one notification. Rate-limited deliveries are reported as such,
/// never as sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent { message_id: String },
    RateLimited { message: String },
    Failed { message: String },
    Disabled,
}

pub async fn deliver(notifier: &dyn Notifier, message: &str) -> NotificationOutcome {
    if !notifier.is_enabled() {
        return NotificationOutcome::Disabled;
    }

    let body = truncate_message(message);
    match notifier.send(body).await {
        Ok(receipt) => {
            info!(
                notifier = notifier.name(),
                message_id = %receipt.message_id,
                "notification sent"
            );
            NotificationOutcome::Sent {
                message_id: receipt.message_id,
            }
        }
        Err(e) if e.is_rate_limited() => {
            warn!(notifier = notifier.name(), "notification quota reached: {e}");
            NotificationOutcome::RateLimited {
                message: "Notification quota reached; alert was not delivered".to_string(),
            }
        }
        Err(e) => {
            warn!(notifier = notifier.name(), "notification failed: {e}");
            NotificationOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

/// Cuts `message` to at most `MAX_MESSAGE_CHARS` characters on a char boundary.
pub fn truncate_message(message: &str) -> &str {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

/// Alert text for a ranked match at or above the notification threshold.
pub fn match_alert_message(title: &str, score: f64, url: &str) -> String {
    format!("✅ Match Found: {title} ({score:.2}%)\nApply: {url}")
}

/// Builds the notifier selected by `NOTIFIER`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    Ok(match (config.notifier, &config.twilio) {
        (NotifierKind::Twilio, Some(twilio)) => Arc::new(TwilioWhatsAppNotifier::new(
            twilio,
            config.request_timeout,
            config.max_retries,
        )?),
        (NotifierKind::Twilio, None) => {
            anyhow::bail!("NOTIFIER=twilio requires Twilio credentials")
        }
        (NotifierKind::Disabled, _) => Arc::new(DisabledNotifier),
    })
}
