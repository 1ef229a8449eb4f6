//! Email subject and body construction.

use super::{
    AppLinks, DEFAULT_HEADER_COLOR, match_date_time, match_location, payload_amount, sport_style,
    sport_tag,
};
use crate::error::NotificationResult;
use crate::models::{Notification, NotificationType, OrganizationCategory, OrganizationInfo};
use crate::templates::TemplateEngine;
use serde::Serialize;

/// Ready-to-send email content.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Where a call-to-action button points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkTarget {
    Home,
    Match,
    MatchFeedback,
    Matches,
    Conversation,
    Profile,
    Payments,
    Support,
    Booking,
    OrganizationMembers,
    OrganizationPayments,
    OrganizationDashboard,
}

/// Button label and link for every type.
const fn call_to_action(t: NotificationType) -> (&'static str, LinkTarget) {
    use LinkTarget as L;
    use NotificationType::*;
    match t {
        MatchInvitation => ("View Invitation", L::Match),
        MatchJoinRequest => ("Review Request", L::Match),
        MatchJoinAccepted | MatchPlayerJoined | MatchUpdated | MatchStartingSoon
        | MatchCompleted | PlayerLeft | Reminder => ("View Match", L::Match),
        MatchJoinRejected | MatchCancelled | PlayerKicked => ("Find Another Match", L::Matches),
        ScoreConfirmation => ("Confirm Score", L::Match),
        FeedbackRequest | FeedbackReminder => ("Rate Your Game", L::MatchFeedback),
        NewMessage | Chat => ("Reply", L::Conversation),
        FriendRequest => ("View Profile", L::Profile),
        RatingReceived => ("View Rating", L::Profile),
        Payment => ("View Payment", L::Payments),
        Support => ("Contact Support", L::Support),
        System => ("Open Rallia", L::Home),
        BookingCreated | BookingConfirmed | BookingReminder | BookingModified
        | BookingCancelledByPlayer | BookingCancelledByOrg => ("View Booking", L::Booking),
        NewMemberJoined | MemberLeft | MemberRoleChanged => ("View Members", L::OrganizationMembers),
        MembershipApproved => ("View Organization", L::OrganizationDashboard),
        PaymentReceived | RefundProcessed => ("View Payments", L::OrganizationPayments),
        PaymentFailed => ("Review Payment", L::OrganizationPayments),
        DailySummary | WeeklyReport => ("Open Dashboard", L::OrganizationDashboard),
    }
}

fn link_url(target: LinkTarget, n: &Notification, links: &AppLinks) -> String {
    let with_target = |prefix: &str, suffix: &str| match n.target_id {
        Some(id) => links.path(&format!("{}/{}{}", prefix, id, suffix)),
        None => links.notifications(),
    };

    match target {
        LinkTarget::Home => links.base().to_string(),
        LinkTarget::Match => with_target("match", ""),
        LinkTarget::MatchFeedback => with_target("match", "/feedback"),
        LinkTarget::Matches => links.path("matches"),
        LinkTarget::Conversation => with_target("chat", ""),
        LinkTarget::Profile => with_target("profile", ""),
        LinkTarget::Payments => links.path("payments"),
        LinkTarget::Support => links.path("support"),
        LinkTarget::Booking => with_target("bookings", ""),
        LinkTarget::OrganizationMembers => links.organization(n.organization_id(), "members"),
        LinkTarget::OrganizationPayments => links.organization(n.organization_id(), "payments"),
        LinkTarget::OrganizationDashboard => links.organization(n.organization_id(), "dashboard"),
    }
}

fn category_color(category: OrganizationCategory) -> &'static str {
    match category {
        OrganizationCategory::Booking => "#2563EB",
        OrganizationCategory::Member => "#7C3AED",
        OrganizationCategory::Payment => "#16A34A",
        OrganizationCategory::System => "#475569",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailsCard {
    Match,
    Booking,
    PaymentIssue,
}

fn details_card(t: NotificationType) -> Option<DetailsCard> {
    use NotificationType::*;
    match t {
        PaymentFailed => Some(DetailsCard::PaymentIssue),
        PaymentReceived | RefundProcessed | Payment => Some(DetailsCard::Booking),
        _ if t.organization_category() == Some(OrganizationCategory::Booking) => {
            Some(DetailsCard::Booking)
        }
        _ if t.is_match_related() => Some(DetailsCard::Match),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct DetailRow {
    label: &'static str,
    value: String,
}

fn detail_rows(card: DetailsCard, n: &Notification) -> Vec<DetailRow> {
    let owned = |v: Option<&str>| v.map(str::to_string);
    let candidates: Vec<(&'static str, Option<String>)> = match card {
        DetailsCard::Match => vec![
            ("Sport", owned(n.sport_name())),
            ("Date & Time", match_date_time(n)),
            ("Location", owned(match_location(n))),
            ("Player", owned(n.payload_str("player_name"))),
        ],
        DetailsCard::Booking => vec![
            ("Court", owned(n.payload_str("court_name"))),
            ("Location", owned(n.payload_str("location_name"))),
            ("Date & Time", match_date_time(n)),
            ("Player", owned(n.payload_str("player_name"))),
            ("Amount", payload_amount(n)),
        ],
        DetailsCard::PaymentIssue => vec![
            ("Amount", payload_amount(n)),
            ("Payer", owned(n.payload_str("payer_name"))),
            ("Reason", owned(n.payload_str("failure_reason"))),
        ],
    };

    candidates
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| DetailRow { label, value }))
        .collect()
}

/// Data handed to the handlebars templates.
#[derive(Debug, Serialize)]
struct EmailView<'a> {
    subject: &'a str,
    brand_name: &'a str,
    header_color: &'a str,
    title: &'a str,
    body: Option<&'a str>,
    details: Vec<DetailRow>,
    cta_label: &'a str,
    cta_url: String,
    preferences_url: String,
    organization: Option<&'a OrganizationInfo>,
}

/// Build the subject and both bodies for `notification`.
///
/// `organization` is only used for branding when the type is
/// organization-scoped.
pub fn format_email(
    notification: &Notification,
    organization: Option<&OrganizationInfo>,
    templates: &TemplateEngine,
    links: &AppLinks,
) -> NotificationResult<EmailContent> {
    let t = notification.notification_type;
    let branded = organization.filter(|_| t.is_organization_scoped());

    let subject = match (branded, sport_tag(notification)) {
        (Some(org), _) => format!("[{}] {}", org.name, notification.title),
        (None, Some(tag)) if t.is_match_related() => format!("[{}] {}", tag, notification.title),
        _ => notification.title.clone(),
    };

    let header_color = match t.organization_category() {
        Some(category) if branded.is_some() => category_color(category),
        _ => notification
            .sport_name()
            .and_then(sport_style)
            .map(|style| style.color)
            .unwrap_or(DEFAULT_HEADER_COLOR),
    };

    let (cta_label, target) = call_to_action(t);
    let view = EmailView {
        subject: &subject,
        brand_name: branded.map(|org| org.name.as_str()).unwrap_or("Rallia"),
        header_color,
        title: &notification.title,
        body: notification.body.as_deref().filter(|b| !b.trim().is_empty()),
        details: details_card(t)
            .map(|card| detail_rows(card, notification))
            .unwrap_or_default(),
        cta_label,
        cta_url: link_url(target, notification, links),
        preferences_url: links.preferences(),
        organization: branded,
    };

    let rendered = templates.render_notification(&view)?;
    Ok(EmailContent {
        subject,
        html: rendered.html,
        text: rendered.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    const MATCH_ID: &str = "0192f0c8-6a4e-7cc3-a2f4-2c1d1c0d5e09";
    const ORG_ID: &str = "0192f0c8-6a4e-7cc3-a2f4-2c1d1c0d5e77";

    fn notification(notification_type: &str, payload: serde_json::Value) -> Notification {
        serde_json::from_value(json!({
            "id": Uuid::nil(),
            "user_id": Uuid::nil(),
            "type": notification_type,
            "target_id": MATCH_ID,
            "title": "Saturday doubles",
            "body": "Alex & Sam want you in",
            "payload": payload
        }))
        .unwrap()
    }

    fn organization() -> OrganizationInfo {
        OrganizationInfo {
            id: Uuid::parse_str(ORG_ID).unwrap(),
            name: "Jarry Tennis Club".to_string(),
            email: Some("desk@jarry.example".to_string()),
            website: None,
        }
    }

    fn render(n: &Notification, org: Option<&OrganizationInfo>) -> EmailContent {
        let engine = TemplateEngine::new().unwrap();
        format_email(n, org, &engine, &AppLinks::new("https://rallia.app")).unwrap()
    }

    #[test]
    fn test_match_subject_gets_sport_tag() {
        let n = notification("match_invitation", json!({"sport_name": "Tennis"}));
        let email = render(&n, None);
        assert_eq!(email.subject, "[tennis] Saturday doubles");
    }

    #[test]
    fn test_non_match_subject_is_plain_title() {
        let n = notification("friend_request", json!({"sport_name": "Tennis"}));
        assert_eq!(render(&n, None).subject, "Saturday doubles");
    }

    #[test]
    fn test_invitation_cta_links_to_match() {
        let n = notification("match_invitation", json!({}));
        let email = render(&n, None);
        assert!(email.html.contains("View Invitation"));
        assert!(email.html.contains(&format!("https://rallia.app/match/{}", MATCH_ID)));
        assert!(email.html.contains("https://rallia.app/settings/notifications"));
    }

    #[test]
    fn test_feedback_cta() {
        let n = notification("feedback_request", json!({}));
        let email = render(&n, None);
        assert!(email.text.contains(&format!(
            "Rate Your Game: https://rallia.app/match/{}/feedback",
            MATCH_ID
        )));
    }

    #[test]
    fn test_missing_target_falls_back_to_notifications() {
        let mut n = notification("match_invitation", json!({}));
        n.target_id = None;
        let email = render(&n, None);
        assert!(email.text.contains("View Invitation: https://rallia.app/notifications"));
    }

    #[test]
    fn test_match_details_card_and_sport_color() {
        let n = notification(
            "match_invitation",
            json!({
                "sport_name": "Tennis",
                "match_date": "2026-10-20",
                "start_time": "18:00",
                "location_name": "Jarry Park",
                "player_name": "Alex"
            }),
        );
        let email = render(&n, None);
        assert!(email.html.contains("Tue, Oct 20 at 6:00 PM"));
        assert!(email.html.contains("Jarry Park"));
        assert!(email.text.contains("Player: Alex"));
        assert!(email.html.contains(sport_style("tennis").unwrap().color));
    }

    #[test]
    fn test_unknown_sport_uses_default_color() {
        let n = notification("match_updated", json!({"sport_name": "Curling"}));
        assert!(render(&n, None).html.contains(DEFAULT_HEADER_COLOR));
    }

    #[test]
    fn test_user_content_is_escaped() {
        let n = notification("system", json!({}));
        let email = render(&n, None);
        assert!(email.html.contains("Alex &amp; Sam want you in"));
        assert!(email.text.contains("Alex & Sam want you in"));
    }

    #[test]
    fn test_organization_branding() {
        let n = notification(
            "booking_confirmed",
            json!({
                "organization_id": ORG_ID,
                "court_name": "Court 4",
                "amount_cents": 2500
            }),
        );
        let org = organization();
        let email = render(&n, Some(&org));

        assert_eq!(email.subject, "[Jarry Tennis Club] Saturday doubles");
        assert!(email.html.contains("#2563EB"));
        assert!(email.html.contains("Court 4"));
        assert!(email.html.contains("$25.00"));
        assert!(email.text.contains("Sent on behalf of Jarry Tennis Club"));
        assert!(email.html.contains(&format!("https://rallia.app/bookings/{}", MATCH_ID)));
    }

    #[test]
    fn test_org_info_ignored_for_personal_types() {
        let n = notification("match_invitation", json!({"sport_name": "Tennis"}));
        let org = organization();
        let email = render(&n, Some(&org));
        assert_eq!(email.subject, "[tennis] Saturday doubles");
        assert!(!email.text.contains("Sent on behalf of"));
    }

    #[test]
    fn test_payment_failed_card() {
        let n = notification(
            "payment_failed",
            json!({
                "organization_id": ORG_ID,
                "amount_cents": 1250,
                "currency": "EUR",
                "payer_name": "Robin",
                "failure_reason": "Card declined",
                "court_name": "Court 9"
            }),
        );
        let org = organization();
        let email = render(&n, Some(&org));
        assert!(email.text.contains("Amount: €12.50"));
        assert!(email.text.contains("Payer: Robin"));
        assert!(email.text.contains("Reason: Card declined"));
        assert!(!email.text.contains("Court 9"));
        assert!(email.text.contains(&format!(
            "Review Payment: https://rallia.app/organization/{}/payments",
            ORG_ID
        )));
    }

    #[test]
    fn test_no_card_for_chat() {
        let n = notification("new_message", json!({"player_name": "Alex"}));
        let email = render(&n, None);
        assert!(!email.text.contains("Player: Alex"));
    }
}
