//! SMS text formatting.
//!
//! Everything is measured in characters, not bytes, and the result never
//! exceeds [`SMS_MAX_LEN`].

use super::{match_date_time, match_location, sport_tag};
use crate::models::{Notification, NotificationType};

/// Single-segment limit.
pub const SMS_MAX_LEN: usize = 160;

const BRAND_PREFIX: &str = "Rallia: ";
const EXTRA_SEPARATOR: &str = " - ";
const ELLIPSIS: &str = "...";
/// Below this many characters of extra content it is dropped instead of cut.
const MIN_EXTRA_CHARS: usize = 10;

/// Lead phrase plus the single fact worth spending characters on.
struct SmsParts {
    core: String,
    extra: Option<String>,
}

/// Build the SMS body for `notification`.
pub fn format_sms(notification: &Notification) -> String {
    let SmsParts { core, extra } = sms_parts(notification);

    let mut message = String::from(BRAND_PREFIX);
    if let Some(tag) = sport_tag(notification) {
        message.push_str(&format!("[{}] ", tag));
    }
    message.push_str(&core);

    if let Some(extra) = extra {
        append_extra(&mut message, &extra);
    }

    truncate_with_ellipsis(&message, SMS_MAX_LEN)
}

fn sms_parts(n: &Notification) -> SmsParts {
    let who = n.payload_str("player_name").map(|name| format!("from {}", name));
    let when = match_date_time(n);
    let location = match_location(n).map(str::to_string);

    let parts = |core: &str, extra: Option<String>| SmsParts {
        core: core.to_string(),
        extra,
    };

    match n.notification_type {
        NotificationType::MatchStartingSoon if n.is_urgent() => {
            parts("URGENT: MATCH STARTING SOON", location.or(when))
        }
        NotificationType::MatchCancelled if n.is_urgent() => {
            parts("URGENT: MATCH CANCELLED", when.or(location))
        }
        NotificationType::MatchInvitation => {
            parts("You're invited to a match", when.or(location).or(who))
        }
        NotificationType::MatchJoinAccepted => {
            parts("You're in! Request accepted", when.or(location))
        }
        NotificationType::MatchStartingSoon => parts("Your match starts soon", location.or(when)),
        NotificationType::Reminder => parts("Match reminder", when.or(location)),
        _ => {
            let core = match n.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
                Some(body) => format!("{} - {}", n.title.trim(), body),
                None => n.title.trim().to_string(),
            };
            SmsParts { core, extra: None }
        }
    }
}

fn append_extra(message: &mut String, extra: &str) {
    let used = message.chars().count() + EXTRA_SEPARATOR.len();
    let room = SMS_MAX_LEN.saturating_sub(used);

    if extra.chars().count() <= room {
        message.push_str(EXTRA_SEPARATOR);
        message.push_str(extra);
    } else if room >= MIN_EXTRA_CHARS + ELLIPSIS.len() {
        message.push_str(EXTRA_SEPARATOR);
        message.push_str(&truncate_with_ellipsis(extra, room));
    }
}

/// Cut to `max` characters, ending in `...` when anything was dropped.
fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn notification(
        notification_type: &str,
        priority: &str,
        title: &str,
        payload: serde_json::Value,
    ) -> Notification {
        serde_json::from_value(json!({
            "id": Uuid::nil(),
            "user_id": Uuid::nil(),
            "type": notification_type,
            "priority": priority,
            "title": title,
            "body": "Some body text",
            "payload": payload
        }))
        .unwrap()
    }

    #[test]
    fn test_long_title_is_cut_to_exactly_160() {
        let title = "x".repeat(200);
        let mut n = notification("system", "normal", &title, json!({}));
        n.body = None;

        let sms = format_sms(&n);
        assert_eq!(sms.chars().count(), SMS_MAX_LEN);
        assert!(sms.starts_with("Rallia: xxx"));
        assert!(sms.ends_with("..."));
    }

    #[test]
    fn test_fallback_joins_title_and_body() {
        let n = notification("friend_request", "normal", "New friend request", json!({}));
        assert_eq!(format_sms(&n), "Rallia: New friend request - Some body text");
    }

    #[test]
    fn test_invitation_uses_lead_phrase_and_date() {
        let n = notification(
            "match_invitation",
            "normal",
            "ignored title",
            json!({"sport_name": "Tennis", "match_date": "2026-10-20", "start_time": "18:00"}),
        );
        assert_eq!(
            format_sms(&n),
            "Rallia: [tennis] You're invited to a match - Tue, Oct 20 at 6:00 PM"
        );
    }

    #[test]
    fn test_invitation_falls_back_to_who() {
        let n = notification(
            "match_invitation",
            "normal",
            "t",
            json!({"player_name": "Sam"}),
        );
        assert_eq!(format_sms(&n), "Rallia: You're invited to a match - from Sam");
    }

    #[test]
    fn test_urgent_framing() {
        let soon = notification(
            "match_starting_soon",
            "urgent",
            "t",
            json!({"location_name": "Jarry Park"}),
        );
        assert_eq!(
            format_sms(&soon),
            "Rallia: URGENT: MATCH STARTING SOON - Jarry Park"
        );

        let cancelled = notification("match_cancelled", "urgent", "t", json!({"match_date": "2026-10-20"}));
        assert_eq!(
            format_sms(&cancelled),
            "Rallia: URGENT: MATCH CANCELLED - Tue, Oct 20"
        );
    }

    #[test]
    fn test_non_urgent_cancellation_uses_title_and_body() {
        let n = notification("match_cancelled", "high", "Match cancelled", json!({}));
        assert_eq!(format_sms(&n), "Rallia: Match cancelled - Some body text");
    }

    #[test]
    fn test_long_extra_is_truncated_to_fit() {
        let location = "L".repeat(200);
        let n = notification(
            "match_starting_soon",
            "normal",
            "t",
            json!({"location_name": location}),
        );
        let sms = format_sms(&n);
        assert_eq!(sms.chars().count(), SMS_MAX_LEN);
        assert!(sms.starts_with("Rallia: Your match starts soon - LLL"));
        assert!(sms.ends_with("L..."));
    }

    #[test]
    fn test_extra_dropped_when_too_little_room() {
        // leaves fewer than 13 characters after the separator
        let sport = "s".repeat(120);
        let n = notification(
            "reminder",
            "normal",
            "t",
            json!({"sport_name": sport, "match_date": "2026-10-20", "start_time": "18:00"}),
        );
        let sms = format_sms(&n);
        assert!(sms.ends_with("] Match reminder"));
        assert!(sms.chars().count() <= SMS_MAX_LEN);
    }

    #[test]
    fn test_multibyte_content_counts_characters() {
        let title = "é".repeat(300);
        let mut n = notification("support", "low", &title, json!({}));
        n.body = None;
        let sms = format_sms(&n);
        assert_eq!(sms.chars().count(), SMS_MAX_LEN);
    }

    #[test]
    fn test_never_exceeds_budget() {
        for len in [0, 1, 100, 151, 152, 153, 160, 161, 500] {
            let title = "t".repeat(len);
            for t in ["match_invitation", "match_join_accepted", "reminder", "chat"] {
                let n = notification(
                    t,
                    "normal",
                    &title,
                    json!({"sport_name": title, "location_name": title, "match_date": title}),
                );
                assert!(format_sms(&n).chars().count() <= SMS_MAX_LEN, "{t} with {len}");
            }
        }
    }
}
