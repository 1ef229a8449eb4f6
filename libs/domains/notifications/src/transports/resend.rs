//! Resend email transport.

use super::{EMAIL_NOT_CONFIGURED, EmailTransport, Receipt, message_from, read_reply};
use crate::config::ResendConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::formatters::EmailContent;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

pub struct ResendEmailTransport {
    config: ResendConfig,
    client: Client,
}

impl ResendEmailTransport {
    pub fn new(config: ResendConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[async_trait]
impl EmailTransport for ResendEmailTransport {
    async fn send(&self, to: &str, email: &EmailContent) -> NotificationResult<Receipt> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(NotificationError::NotConfigured(EMAIL_NOT_CONFIGURED.to_string()));
        };

        let request = ResendRequest {
            from: self.config.sender(),
            to: [to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        debug!(to = %to, subject = %email.subject, "Sending email via Resend");

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let (status, body) = read_reply(response).await?;

        if status.is_success() {
            info!(to = %to, id = ?body.get("id"), "Email sent via Resend");
            Ok(body)
        } else {
            let message = message_from(&body, &["message", "error"])
                .unwrap_or_else(|| format!("Resend error ({})", status));
            error!(to = %to, status = %status, error = %message, "Failed to send email via Resend");
            Err(NotificationError::provider(message, Some(body)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::http_client;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> EmailContent {
        EmailContent {
            subject: "[tennis] Match cancelled".to_string(),
            html: "<p>Cancelled</p>".to_string(),
            text: "Cancelled".to_string(),
        }
    }

    fn transport(api_url: String, api_key: Option<&str>) -> ResendEmailTransport {
        let config = ResendConfig {
            api_key: api_key.map(str::to_string),
            api_url,
            ..ResendConfig::default()
        };
        ResendEmailTransport::new(config, http_client(5).unwrap())
    }

    #[tokio::test]
    async fn test_send_success_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(bearer_token("re_test"))
            .and(body_partial_json(json!({
                "from": "Rallia <notifications@rallia.app>",
                "to": ["sam@example.com"],
                "subject": "[tennis] Match cancelled",
                "text": "Cancelled"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "em_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = transport(server.uri(), Some("re_test"))
            .send("sam@example.com", &email())
            .await
            .unwrap();
        assert_eq!(receipt, json!({"id": "em_1"}));
    }

    #[tokio::test]
    async fn test_provider_error_keeps_message_and_body() {
        let server = MockServer::start().await;
        let error_body = json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "Invalid `to` field"
        });
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(error_body.clone()))
            .mount(&server)
            .await;

        let err = transport(server.uri(), Some("re_test"))
            .send("nope", &email())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid `to` field");
        assert_eq!(err.provider_response(), Some(error_body));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = transport(server.uri(), Some("re_test"))
            .send("sam@example.com", &email())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("502"));
        assert_eq!(
            err.provider_response(),
            Some(json!({"status": 502, "body": "bad gateway"}))
        );
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = transport(server.uri(), None)
            .send("sam@example.com", &email())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), EMAIL_NOT_CONFIGURED);
    }
}
