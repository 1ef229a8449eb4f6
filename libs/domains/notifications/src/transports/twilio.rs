//! Twilio SMS transport.

use super::{Receipt, SMS_NOT_CONFIGURED, SmsTransport, message_from, read_reply};
use crate::config::TwilioConfig;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

pub struct TwilioSmsTransport {
    config: TwilioConfig,
    client: Client,
}

impl TwilioSmsTransport {
    pub fn new(config: TwilioConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SmsTransport for TwilioSmsTransport {
    async fn send(&self, to: &str, body: &str) -> NotificationResult<Receipt> {
        let Some((account_sid, auth_token, from)) = self.config.credentials() else {
            return Err(NotificationError::NotConfigured(SMS_NOT_CONFIGURED.to_string()));
        };

        debug!(to = %to, length = body.chars().count(), "Sending SMS via Twilio");

        let response = self
            .client
            .post(format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                self.config.api_url, account_sid
            ))
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;
        let (status, reply) = read_reply(response).await?;

        if status.is_success() {
            info!(to = %to, sid = ?reply.get("sid"), "SMS sent via Twilio");
            Ok(reply)
        } else {
            let message = message_from(&reply, &["message"])
                .unwrap_or_else(|| format!("Twilio error ({})", status));
            error!(to = %to, status = %status, error = %message, "Failed to send SMS via Twilio");
            Err(NotificationError::provider(message, Some(reply)))
        }
    }
}
