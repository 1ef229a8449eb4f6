//! Channel content formatters.
//!
//! Pure functions from a [`Notification`] to channel payloads. Nothing in
//! here touches the network or a store.

pub mod email;
pub mod push;
pub mod sms;

pub use email::{EmailContent, format_email};
pub use push::{PushContent, format_push};
pub use sms::{SMS_MAX_LEN, format_sms};

use crate::models::Notification;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// Accent colour and emoji for a sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SportStyle {
    pub color: &'static str,
    pub emoji: &'static str,
}

pub const DEFAULT_HEADER_COLOR: &str = "#0D9488";

/// Lookup keyed by lower-cased sport name.
pub fn sport_style(sport: &str) -> Option<SportStyle> {
    let style = |color, emoji| Some(SportStyle { color, emoji });
    match sport.trim().to_lowercase().as_str() {
        "tennis" => style("#65A30D", "🎾"),
        "pickleball" => style("#0891B2", "🏓"),
        "padel" => style("#2563EB", "🎾"),
        "badminton" => style("#EA580C", "🏸"),
        "squash" => style("#9333EA", "🎾"),
        "table tennis" => style("#DC2626", "🏓"),
        _ => None,
    }
}

/// Lower-cased sport name used in `[tennis]`-style prefixes.
pub fn sport_tag(notification: &Notification) -> Option<String> {
    notification.sport_name().map(str::to_lowercase)
}

/// `2025-10-20` becomes `Tue, Oct 20`; anything else is returned verbatim.
pub fn format_match_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// `18:00` or `18:00:00` becomes `6:00 PM`; anything else is returned verbatim.
pub fn format_match_time(raw: &str) -> String {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M"))
        .map(|time| time.format("%-I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Date and start time joined as `Tue, Oct 20 at 6:00 PM`, or whichever half exists.
pub fn match_date_time(notification: &Notification) -> Option<String> {
    let date = notification.payload_str("match_date").map(format_match_date);
    let time = notification.payload_str("start_time").map(format_match_time);
    match (date, time) {
        (Some(date), Some(time)) => Some(format!("{} at {}", date, time)),
        (date, time) => date.or(time),
    }
}

/// Venue: the location name, else the court name.
pub fn match_location(notification: &Notification) -> Option<&str> {
    notification
        .payload_str("location_name")
        .or_else(|| notification.payload_str("court_name"))
}

/// Minor units rendered with a currency symbol, e.g. `$12.50` or `12.50 CHF`.
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    let number = format!("{}.{:02}", abs / 100, abs % 100);
    let code = currency.trim().to_uppercase();
    match code.as_str() {
        "CAD" | "USD" | "AUD" | "NZD" => format!("{sign}${number}"),
        "EUR" => format!("{sign}€{number}"),
        "GBP" => format!("{sign}£{number}"),
        _ => format!("{sign}{number} {code}"),
    }
}

/// `amount_cents` with the payload currency (CAD when absent).
pub fn payload_amount(notification: &Notification) -> Option<String> {
    let cents = notification.payload_i64("amount_cents")?;
    let currency = notification.payload_str("currency").unwrap_or("CAD");
    Some(format_amount(cents, currency))
}

/// Deep links into the web app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLinks {
    base_url: String,
}

impl AppLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn notifications(&self) -> String {
        self.path("notifications")
    }

    pub fn preferences(&self) -> String {
        self.path("settings/notifications")
    }

    pub fn organization(&self, organization_id: Option<Uuid>, section: &str) -> String {
        match organization_id {
            Some(id) => self.path(&format!("organization/{}/{}", id, section)),
            None => self.path(&format!("organization/{}", section)),
        }
    }
}
