//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Open key/value bag carried by a notification (sport name, match date, ...).
pub type Payload = Map<String, Value>;

// ============================================================================
// Enumerations
// ============================================================================

/// Every kind of notification the dispatcher knows how to deliver.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    MatchInvitation,
    MatchJoinRequest,
    MatchJoinAccepted,
    MatchJoinRejected,
    MatchPlayerJoined,
    MatchCancelled,
    MatchUpdated,
    MatchStartingSoon,
    MatchCompleted,
    PlayerKicked,
    PlayerLeft,
    Reminder,
    NewMessage,
    Chat,
    FriendRequest,
    RatingReceived,
    FeedbackRequest,
    FeedbackReminder,
    ScoreConfirmation,
    Payment,
    Support,
    System,
    BookingCreated,
    BookingConfirmed,
    BookingReminder,
    BookingModified,
    BookingCancelledByPlayer,
    BookingCancelledByOrg,
    NewMemberJoined,
    MemberLeft,
    MemberRoleChanged,
    MembershipApproved,
    PaymentReceived,
    PaymentFailed,
    RefundProcessed,
    DailySummary,
    WeeklyReport,
}

/// Grouping used for organization-branded mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OrganizationCategory {
    Booking,
    Member,
    Payment,
    System,
}

impl NotificationType {
    /// Types whose preferences and branding resolve against an organization.
    pub fn is_organization_scoped(self) -> bool {
        self.organization_category().is_some()
    }

    pub fn organization_category(self) -> Option<OrganizationCategory> {
        use NotificationType::*;
        match self {
            BookingCreated | BookingConfirmed | BookingReminder | BookingModified
            | BookingCancelledByPlayer | BookingCancelledByOrg => {
                Some(OrganizationCategory::Booking)
            }
            NewMemberJoined | MemberLeft | MemberRoleChanged | MembershipApproved => {
                Some(OrganizationCategory::Member)
            }
            PaymentReceived | PaymentFailed | RefundProcessed => {
                Some(OrganizationCategory::Payment)
            }
            DailySummary | WeeklyReport => Some(OrganizationCategory::System),
            MatchInvitation | MatchJoinRequest | MatchJoinAccepted | MatchJoinRejected
            | MatchPlayerJoined | MatchCancelled | MatchUpdated | MatchStartingSoon
            | MatchCompleted | PlayerKicked | PlayerLeft | Reminder | NewMessage | Chat
            | FriendRequest | RatingReceived | FeedbackRequest | FeedbackReminder
            | ScoreConfirmation | Payment | Support | System => None,
        }
    }

    /// Types about a match: they get the sport tag, sport emoji and match card.
    pub fn is_match_related(self) -> bool {
        use NotificationType::*;
        matches!(
            self,
            MatchInvitation
                | MatchJoinRequest
                | MatchJoinAccepted
                | MatchJoinRejected
                | MatchPlayerJoined
                | MatchCancelled
                | MatchUpdated
                | MatchStartingSoon
                | MatchCompleted
                | PlayerKicked
                | PlayerLeft
                | Reminder
                | FeedbackRequest
                | FeedbackReminder
                | ScoreConfirmation
        )
    }
}

/// Delivery channel. Ordering is the processing order: email, push, sms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Email,
    Push,
    Sms,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Push, Channel::Sms];
}

/// Outcome recorded on a delivery attempt.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    /// Reserved for upstream queuing; never written by the dispatcher.
    Pending,
    Success,
    Failed,
    SkippedPreference,
    SkippedMissingContact,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

// ============================================================================
// Notification record
// ============================================================================

/// One event to deliver, as written by upstream application logic.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient user.
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub target_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "payload_or_empty")]
    #[schema(value_type = Object)]
    pub payload: Payload,
    #[serde(default)]
    pub priority: NotificationPriority,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn payload_or_empty<'de, D>(deserializer: D) -> Result<Payload, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Payload>::deserialize(deserializer)?.unwrap_or_default())
}

impl Notification {
    /// Non-empty string value from the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Integer value from the payload; numeric strings are accepted.
    pub fn payload_i64(&self, key: &str) -> Option<i64> {
        match self.payload.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn organization_id(&self) -> Option<Uuid> {
        self.payload_str("organization_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn sport_name(&self) -> Option<&str> {
        self.payload_str("sport_name")
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == NotificationPriority::Urgent
    }

    /// True while `scheduled_at` lies in the future.
    pub fn is_scheduled_after(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at.is_some_and(|at| at > now)
    }
}

// ============================================================================
// Read-only inputs
// ============================================================================

/// Explicit (type, channel) preference row for a user or an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreference {
    pub notification_type: NotificationType,
    pub channel: Channel,
    pub enabled: bool,
}

impl ChannelPreference {
    pub fn new(notification_type: NotificationType, channel: Channel, enabled: bool) -> Self {
        Self {
            notification_type,
            channel,
            enabled,
        }
    }
}

/// Snapshot of the addresses a recipient can be reached on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub push_token: Option<String>,
    pub push_enabled: bool,
}

/// Organization used for branded templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationInfo {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub website: Option<String>,
}

// ============================================================================
// Audit records
// ============================================================================

/// Status, message and provider body produced for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome {
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub provider_response: Option<Value>,
}

impl ChannelOutcome {
    pub fn success(provider_response: Option<Value>) -> Self {
        Self {
            status: DeliveryStatus::Success,
            error_message: None,
            provider_response,
        }
    }

    pub fn failed(message: impl Into<String>, provider_response: Option<Value>) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            error_message: Some(message.into()),
            provider_response,
        }
    }

    pub fn skipped(status: DeliveryStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            error_message: Some(reason.into()),
            provider_response: None,
        }
    }
}

/// Append-only audit row: one per channel per dispatcher invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryAttempt {
    pub id: Uuid,
    pub notification_id: Uuid,
    /// 1-based, dense, in channel-processing order within one invocation.
    pub attempt_number: i32,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub provider_response: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryAttempt {
    pub fn new(
        notification_id: Uuid,
        attempt_number: i32,
        channel: Channel,
        outcome: ChannelOutcome,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            notification_id,
            attempt_number,
            channel,
            status: outcome.status,
            error_message: outcome.error_message,
            provider_response: outcome.provider_response,
            created_at: Utc::now(),
        }
    }
}
