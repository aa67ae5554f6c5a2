//! WhatsApp delivery through Twilio's Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::TwilioConfig;
use crate::notify::{DeliveryReceipt, Notifier};
use crate::provider::{build_http_client, send_with_retry, ProviderError};

const PROVIDER: &str = "twilio";
const API_BASE: &str = "https://api.twilio.com/2010-04-01";

pub struct TwilioWhatsAppNotifier {
    client: Client,
    endpoint: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
    max_retries: u32,
}

impl TwilioWhatsAppNotifier {
    pub fn new(config: &TwilioConfig, timeout: Duration, max_retries: u32) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(PROVIDER, timeout)?,
            endpoint: format!("{API_BASE}/Accounts/{}/Messages.json", config.account_sid),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: whatsapp_address(&config.whatsapp_from),
            to: whatsapp_address(&config.whatsapp_to),
            max_retries,
        })
    }
}

/// Twilio needs the `whatsapp:` channel prefix on both ends.
fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[async_trait]
impl Notifier for TwilioWhatsAppNotifier {
    async fn send(&self, message: &str) -> Result<DeliveryReceipt, ProviderError> {
        let form = [
            ("Body", message),
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
        ];
        let response = send_with_retry(PROVIDER, self.max_retries, || {
            self.client
                .post(&self.endpoint)
                .basic_auth(&self.account_sid, Some(&self.auth_token))
                .form(&form)
        })
        .await?;

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        Ok(DeliveryReceipt {
            message_id: resource.sid,
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
