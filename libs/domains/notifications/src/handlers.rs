//! HTTP entry point.
//!
//! Accepts either a database trigger envelope
//! (`{"type": "INSERT", "table": "notification", "record": {...}}`) or a bare
//! notification record, then hands the notification to the dispatcher.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::dispatcher::Dispatch;
use crate::error::NotificationError;
use crate::models::Notification;

/// OpenAPI documentation for the dispatcher entry point
#[derive(OpenApi)]
#[openapi(
    paths(dispatch_notification),
    components(schemas(Notification, DispatchedResponse, ScheduledResponse, ErrorResponse)),
    tags((name = "notifications", description = "Notification delivery"))
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchedResponse {
    pub success: bool,
    pub notification_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledResponse {
    pub success: bool,
    pub message: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Failures surfaced to the caller. Per-channel failures never get here.
#[derive(Debug)]
pub enum HandlerError {
    BadRequest(String),
    Dispatch(NotificationError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HandlerError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            HandlerError::Dispatch(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        let body = ErrorResponse {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

/// Pull the notification out of either accepted request shape.
pub fn parse_notification(body: &[u8]) -> Result<Notification, HandlerError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| HandlerError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let record = if is_insert_trigger(&value) {
        value.get("record").cloned().unwrap_or(Value::Null)
    } else if is_notification_record(&value) {
        value
    } else {
        return Err(HandlerError::BadRequest(
            "Invalid request: expected a notification insert trigger or a notification record"
                .to_string(),
        ));
    };

    serde_json::from_value(record)
        .map_err(|e| HandlerError::BadRequest(format!("Invalid notification record: {}", e)))
}

fn is_insert_trigger(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("INSERT")
        && value.get("table").and_then(Value::as_str) == Some("notification")
        && value.get("record").is_some_and(Value::is_object)
}

fn is_notification_record(value: &Value) -> bool {
    ["id", "user_id", "type"]
        .iter()
        .all(|key| value.get(*key).is_some())
}

/// Dispatch a newly created notification
#[utoipa::path(
    post,
    path = "/",
    tag = "notifications",
    request_body = Notification,
    responses(
        (status = 200, description = "Notification dispatched; a future scheduled_at returns ScheduledResponse instead", body = DispatchedResponse),
        (status = 400, description = "Neither a trigger envelope nor a notification", body = ErrorResponse),
        (status = 500, description = "Dispatch failed", body = ErrorResponse)
    )
)]
pub async fn dispatch_notification<D: Dispatch>(
    State(dispatcher): State<Arc<D>>,
    body: Bytes,
) -> Result<Response, HandlerError> {
    let notification = parse_notification(&body).inspect_err(|err| {
        warn!(error = ?err, "Rejected dispatch request");
    })?;

    if let Some(scheduled_at) = notification
        .scheduled_at
        .filter(|_| notification.is_scheduled_after(Utc::now()))
    {
        info!(notification_id = %notification.id, %scheduled_at, "Notification scheduled for later");
        let body = ScheduledResponse {
            success: true,
            message: "Notification scheduled for later".to_string(),
            scheduled_at,
        };
        return Ok(Json(body).into_response());
    }

    let report = dispatcher.dispatch(&notification).await.map_err(|err| {
        error!(notification_id = %notification.id, error = %err, "Dispatch failed");
        HandlerError::Dispatch(err)
    })?;

    Ok(Json(DispatchedResponse {
        success: true,
        notification_id: report.notification_id,
    })
    .into_response())
}

/// CORS preflight.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, x-client-info, apikey, content-type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

/// Create the dispatcher router
pub fn router<D: Dispatch + 'static>(dispatcher: D) -> Router {
    let shared_dispatcher = Arc::new(dispatcher);

    Router::new()
        .route(
            "/",
            post(dispatch_notification::<D>).options(preflight),
        )
        .layer(middleware::map_response(add_cors_headers))
        .with_state(shared_dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{DispatchMode, DispatchReport, MockDispatch};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn record() -> Value {
        json!({
            "id": "0192f0c8-6a4e-7cc3-a2f4-2c1d1c0d5e01",
            "user_id": "0192f0c8-6a4e-7cc3-a2f4-2c1d1c0d5e02",
            "type": "match_invitation",
            "title": "You're invited"
        })
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_parse_envelope_and_direct_shapes() {
        let envelope = json!({"type": "INSERT", "table": "notification", "record": record()});
        let from_envelope = parse_notification(envelope.to_string().as_bytes()).unwrap();
        let direct = parse_notification(record().to_string().as_bytes()).unwrap();
        assert_eq!(from_envelope.id, direct.id);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for body in [
            json!({"type": "UPDATE", "table": "notification", "record": record()}),
            json!({"type": "INSERT", "table": "match", "record": record()}),
            json!({"hello": "world"}),
            json!([1, 2, 3]),
        ] {
            assert!(matches!(
                parse_notification(body.to_string().as_bytes()),
                Err(HandlerError::BadRequest(_))
            ));
        }
        assert!(parse_notification(b"not json").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let mut bad = record();
        bad["type"] = json!("telegram");
        assert!(matches!(
            parse_notification(bad.to_string().as_bytes()),
            Err(HandlerError::BadRequest(message)) if message.starts_with("Invalid notification record")
        ));
    }

    #[tokio::test]
    async fn test_dispatch_success_returns_notification_id() {
        let mut dispatcher = MockDispatch::new();
        dispatcher.expect_dispatch().times(1).returning(|n| {
            Ok(DispatchReport {
                notification_id: n.id,
                mode: DispatchMode::Personal,
                attempts: vec![],
            })
        });

        let response = router(dispatcher).oneshot(post_json(record())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["notification_id"], "0192f0c8-6a4e-7cc3-a2f4-2c1d1c0d5e01");
    }

    #[tokio::test]
    async fn test_dispatch_error_returns_500() {
        let mut dispatcher = MockDispatch::new();
        dispatcher.expect_dispatch().returning(|_| {
            Err(NotificationError::Database(
                "No delivery attempt could be recorded".to_string(),
            ))
        });

        let response = router(dispatcher).oneshot(post_json(record())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("No delivery attempt"));
    }

    #[tokio::test]
    async fn test_bad_shape_returns_400_without_dispatch() {
        let mut dispatcher = MockDispatch::new();
        dispatcher.expect_dispatch().times(0);

        let response = router(dispatcher)
            .oneshot(post_json(json!({"hello": "world"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_future_schedule_short_circuits() {
        let mut dispatcher = MockDispatch::new();
        dispatcher.expect_dispatch().times(0);

        let scheduled_at = Utc::now() + chrono::Duration::hours(1);
        let mut body = record();
        body["scheduled_at"] = json!(scheduled_at);

        let response = router(dispatcher).oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Notification scheduled for later");
        let echoed: DateTime<Utc> = serde_json::from_value(body["scheduled_at"].clone()).unwrap();
        assert_eq!(echoed, scheduled_at);
    }

    #[tokio::test]
    async fn test_preflight_returns_204_with_cors() {
        let response = router(MockDispatch::new())
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "authorization, x-client-info, apikey, content-type"
        );
    }
}
