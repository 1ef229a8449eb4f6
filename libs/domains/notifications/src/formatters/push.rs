//! Push notification payloads.

use super::sport_style;
use crate::models::{
    Notification, NotificationPriority, NotificationType, OrganizationCategory, Payload,
};
use serde::Serialize;
use serde_json::Value;

const URGENT_TTL_SECS: u32 = 60 * 60;
const DEFAULT_TTL_SECS: u32 = 24 * 60 * 60;

/// Everything the push provider needs except the device token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Deep-link data: the notification payload plus its id, type and target.
    pub data: Payload,
    pub sound: &'static str,
    pub priority: &'static str,
    pub ttl: u32,
    /// Android notification channel.
    pub channel_id: &'static str,
    /// iOS action category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<&'static str>,
}

pub fn format_push(notification: &Notification) -> PushContent {
    let t = notification.notification_type;

    let title = match notification.sport_name().and_then(sport_style) {
        // match, feedback and reminder types
        Some(style) if t.is_match_related() => format!("{} {}", style.emoji, notification.title),
        _ => notification.title.clone(),
    };

    let mut data = notification.payload.clone();
    data.insert(
        "notification_id".to_string(),
        Value::String(notification.id.to_string()),
    );
    data.insert("type".to_string(), Value::String(t.to_string()));
    if let Some(target_id) = notification.target_id {
        data.insert("target_id".to_string(), Value::String(target_id.to_string()));
    }

    let priority = match notification.priority {
        NotificationPriority::High | NotificationPriority::Urgent => "high",
        NotificationPriority::Low | NotificationPriority::Normal => "normal",
    };

    PushContent {
        title,
        body: notification.body.clone(),
        data,
        sound: "default",
        priority,
        ttl: if notification.is_urgent() {
            URGENT_TTL_SECS
        } else {
            DEFAULT_TTL_SECS
        },
        channel_id: android_channel(t, notification.is_urgent()),
        category_id: ios_category(t),
    }
}

fn android_channel(t: NotificationType, urgent: bool) -> &'static str {
    use NotificationType::*;
    match t {
        NewMessage | Chat => "chat",
        FeedbackRequest | FeedbackReminder | RatingReceived => "feedback",
        _ if t.is_match_related() && urgent => "match_urgent",
        _ if t.is_match_related() => "matches",
        _ if t.organization_category() == Some(OrganizationCategory::Booking) => "bookings",
        _ => "default",
    }
}

fn ios_category(t: NotificationType) -> Option<&'static str> {
    use NotificationType::*;
    match t {
        MatchInvitation | MatchJoinRequest => Some("match_request"),
        FeedbackRequest => Some("feedback_request"),
        NewMessage | Chat => Some("message"),
        _ => None,
    }
}
