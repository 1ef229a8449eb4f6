//! Expo push transport.

use super::{INVALID_PUSH_TOKEN, PushTransport, Receipt, message_from, read_reply};
use crate::config::ExpoConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::formatters::PushContent;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

/// Expo accepts at most this many messages per request.
pub const MAX_BATCH_SIZE: usize = 100;

static EXPO_PUSH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Expo(nent)?PushToken\[.+\]$").unwrap());

/// `ExponentPushToken[...]` or `ExpoPushToken[...]`.
pub fn is_expo_push_token(token: &str) -> bool {
    EXPO_PUSH_TOKEN.is_match(token)
}

pub struct ExpoPushTransport {
    config: ExpoConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ExpoMessage<'a> {
    to: &'a str,
    #[serde(flatten)]
    content: &'a PushContent,
}

impl ExpoPushTransport {
    pub fn new(config: ExpoConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Send many messages, up to [`MAX_BATCH_SIZE`] per request.
    ///
    /// Returns one result per input, in input order. Malformed tokens fail
    /// without being sent; a failed request fails every message in it.
    pub async fn send_batch(
        &self,
        messages: &[(String, PushContent)],
    ) -> Vec<NotificationResult<Receipt>> {
        let mut results: Vec<Option<NotificationResult<Receipt>>> =
            messages.iter().map(|_| None).collect();

        let mut valid = Vec::new();
        for (index, (token, content)) in messages.iter().enumerate() {
            if is_expo_push_token(token) {
                valid.push((index, ExpoMessage { to: token, content }));
            } else {
                warn!(index, "Skipping malformed Expo push token");
                results[index] = Some(Err(invalid_token()));
            }
        }

        for chunk in valid.chunks(MAX_BATCH_SIZE) {
            let batch: Vec<&ExpoMessage> = chunk.iter().map(|(_, message)| message).collect();
            match self.post(&batch).await {
                Ok(tickets) => {
                    for (position, (index, _)) in chunk.iter().enumerate() {
                        results[*index] = Some(ticket_result(tickets.get(position)));
                    }
                }
                Err(err) => {
                    for (index, _) in chunk {
                        results[*index] = Some(Err(NotificationError::provider(
                            err.to_string(),
                            err.provider_response(),
                        )));
                    }
                }
            }
        }

        results
            .into_iter()
            .map(|result| {
                result.unwrap_or_else(|| {
                    Err(NotificationError::Internal("Push message was not processed".to_string()))
                })
            })
            .collect()
    }

    /// POST a batch and return the per-message tickets.
    async fn post(&self, batch: &[&ExpoMessage<'_>]) -> NotificationResult<Vec<Value>> {
        debug!(count = batch.len(), "Sending push notifications via Expo");

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header("Accept", "application/json")
            .json(batch);
        if let Some(token) = self.config.access_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let (status, body) = read_reply(request.send().await?).await?;

        if !status.is_success() {
            let message = request_error(&body).unwrap_or_else(|| format!("Expo error ({})", status));
            error!(status = %status, error = %message, "Expo rejected push request");
            return Err(NotificationError::provider(message, Some(body)));
        }

        match body.get("data").and_then(Value::as_array) {
            Some(tickets) => Ok(tickets.clone()),
            None => {
                let message = request_error(&body)
                    .unwrap_or_else(|| "Unexpected response from Expo".to_string());
                Err(NotificationError::provider(message, Some(body)))
            }
        }
    }
}

fn invalid_token() -> NotificationError {
    NotificationError::InvalidRecipient(INVALID_PUSH_TOKEN.to_string())
}

/// Message from a request-level `errors` array.
fn request_error(body: &Value) -> Option<String> {
    body.get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|first| message_from(first, &["message", "code"]))
}

/// `{status: "ok", id}` is a success; anything else is the ticket's error.
fn ticket_result(ticket: Option<&Value>) -> NotificationResult<Receipt> {
    let Some(ticket) = ticket else {
        return Err(NotificationError::provider("Missing push ticket from Expo", None));
    };

    match ticket.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(ticket.clone()),
        _ => {
            let message = message_from(ticket, &["message"])
                .or_else(|| {
                    ticket
                        .get("details")
                        .and_then(|details| message_from(details, &["error"]))
                })
                .unwrap_or_else(|| "Push notification rejected".to_string());
            Err(NotificationError::provider(message, Some(ticket.clone())))
        }
    }
}

#[async_trait]
impl PushTransport for ExpoPushTransport {
    async fn send(&self, token: &str, push: &PushContent) -> NotificationResult<Receipt> {
        if !is_expo_push_token(token) {
            return Err(invalid_token());
        }

        let message = ExpoMessage { to: token, content: push };
        let tickets = self.post(&[&message]).await?;
        let result = ticket_result(tickets.first());
        if result.is_ok() {
            info!(title = %push.title, "Push notification accepted by Expo");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::http_client;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const TOKEN: &str = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]";

    fn content(title: &str) -> PushContent {
        PushContent {
            title: title.to_string(),
            body: Some("Court 3".to_string()),
            data: serde_json::Map::new(),
            sound: "default",
            priority: "high",
            ttl: 3600,
            channel_id: "match_urgent",
            category_id: None,
        }
    }

    fn transport(server: &MockServer, access_token: Option<&str>) -> ExpoPushTransport {
        let config = ExpoConfig {
            access_token: access_token.map(str::to_string),
            api_url: format!("{}/--/api/v2/push/send", server.uri()),
        };
        ExpoPushTransport::new(config, http_client(5).unwrap())
    }

    #[test]
    fn test_token_shape() {
        assert!(is_expo_push_token(TOKEN));
        assert!(is_expo_push_token("ExpoPushToken[abc]"));
        assert!(!is_expo_push_token("ExponentPushToken[]"));
        assert!(!is_expo_push_token("fcm:abc"));
        assert!(!is_expo_push_token("ExponentPushToken[abc"));
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/--/api/v2/push/send"))
            .and(bearer_token("expo_secret"))
            .and(body_partial_json(json!([{
                "to": TOKEN,
                "title": "Match cancelled",
                "channelId": "match_urgent",
                "ttl": 3600
            }])))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"status": "ok", "id": "ticket-1"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let receipt = transport(&server, Some("expo_secret"))
            .send(TOKEN, &content("Match cancelled"))
            .await
            .unwrap();
        assert_eq!(receipt["id"], "ticket-1");
    }

    #[tokio::test]
    async fn test_ticket_error_is_failure() {
        let server = MockServer::start().await;
        let ticket = json!({
            "status": "error",
            "message": "\"ExponentPushToken[xxx]\" is not a registered push notification recipient",
            "details": {"error": "DeviceNotRegistered"}
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [ticket.clone()]})))
            .mount(&server)
            .await;

        let err = transport(&server, None)
            .send(TOKEN, &content("t"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a registered push notification recipient"));
        assert_eq!(err.provider_response(), Some(ticket));
    }

    #[tokio::test]
    async fn test_request_level_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"code": "VALIDATION_ERROR", "message": "\"to\" must be a string"}]
            })))
            .mount(&server)
            .await;

        let err = transport(&server, None)
            .send(TOKEN, &content("t"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "\"to\" must be a string");
    }

    #[tokio::test]
    async fn test_malformed_token_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = transport(&server, None)
            .send("not-a-token", &content("t"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_PUSH_TOKEN);
    }

    #[tokio::test]
    async fn test_send_batch_chunks_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(|request: &Request| {
                let sent: Vec<Value> = serde_json::from_slice(&request.body).unwrap();
                let tickets: Vec<Value> = sent
                    .iter()
                    .map(|m| json!({"status": "ok", "id": m["title"]}))
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({ "data": tickets }))
            })
            .expect(2)
            .mount(&server)
            .await;

        let mut messages: Vec<(String, PushContent)> = (0..150)
            .map(|i| (format!("ExpoPushToken[device-{}]", i), content(&format!("m{}", i))))
            .collect();
        messages[3].0 = "garbage".to_string();

        let results = transport(&server, None).send_batch(&messages).await;

        assert_eq!(results.len(), 150);
        assert_eq!(
            results[3].as_ref().unwrap_err().to_string(),
            INVALID_PUSH_TOKEN
        );
        assert_eq!(results[0].as_ref().unwrap()["id"], "m0");
        assert_eq!(results[120].as_ref().unwrap()["id"], "m120");
        assert_eq!(results[149].as_ref().unwrap()["id"], "m149");
    }
}
