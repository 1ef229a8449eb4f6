//! Channel transports.
//!
//! Each transport makes one provider call and reports it as a `Result`:
//! `Ok` carries the provider receipt, `Err` a readable message plus the raw
//! provider body when there was one. Missing credentials fail before any
//! network call.

mod expo;
mod resend;
mod twilio;

pub use expo::{ExpoPushTransport, is_expo_push_token};
pub use resend::ResendEmailTransport;
pub use twilio::TwilioSmsTransport;

use crate::error::{NotificationError, NotificationResult};
use crate::formatters::{EmailContent, PushContent};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;

/// Provider acknowledgement (message id, ticket, ...), stored on the attempt row.
pub type Receipt = Value;

pub const EMAIL_NOT_CONFIGURED: &str = "Email service not configured";
pub const SMS_NOT_CONFIGURED: &str = "SMS service not configured";
pub const INVALID_PUSH_TOKEN: &str = "Invalid Expo push token format";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, to: &str, email: &EmailContent) -> NotificationResult<Receipt>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, token: &str, push: &PushContent) -> NotificationResult<Receipt>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> NotificationResult<Receipt>;
}

/// Shared HTTP client; `timeout_secs` bounds every provider call.
pub fn http_client(timeout_secs: u64) -> NotificationResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NotificationError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Status plus body, parsed as JSON when possible.
async fn read_reply(response: Response) -> NotificationResult<(StatusCode, Value)> {
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str(&text)
        .unwrap_or_else(|_| json!({ "status": status.as_u16(), "body": text }));
    Ok((status, body))
}

/// First string found under `keys`, for pulling a message out of an error body.
fn message_from(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
