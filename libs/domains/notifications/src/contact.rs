//! Per-channel contact validation.

use crate::models::{Channel, ContactInfo};
use regex::Regex;
use std::sync::LazyLock;

/// `+`, a non-zero leading digit, then 6 to 14 more digits.
static E164_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

pub const NO_EMAIL: &str = "No email address";
pub const PUSH_DISABLED: &str = "Push notifications disabled by user";
pub const NO_PUSH_TOKEN: &str = "No push token registered";
pub const NO_PHONE: &str = "No phone number";
pub const PHONE_NOT_VERIFIED: &str = "Phone number not verified";
pub const INVALID_PHONE: &str = "Invalid phone number format";

/// Result of checking one channel against a contact snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactCheck {
    /// Address to deliver to (the phone number comes back normalized).
    Valid(String),
    /// Human-readable reason the channel cannot be used.
    Invalid(&'static str),
}

impl ContactCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ContactCheck::Valid(_))
    }
}

/// Strip the separators people type into phone numbers.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

pub fn validate_contact(channel: Channel, contact: &ContactInfo) -> ContactCheck {
    match channel {
        Channel::Email => match non_blank(&contact.email) {
            Some(email) => ContactCheck::Valid(email.to_string()),
            None => ContactCheck::Invalid(NO_EMAIL),
        },
        Channel::Push => {
            if !contact.push_enabled {
                return ContactCheck::Invalid(PUSH_DISABLED);
            }
            match non_blank(&contact.push_token) {
                Some(token) => ContactCheck::Valid(token.to_string()),
                None => ContactCheck::Invalid(NO_PUSH_TOKEN),
            }
        }
        Channel::Sms => {
            let Some(phone) = non_blank(&contact.phone) else {
                return ContactCheck::Invalid(NO_PHONE);
            };
            if !contact.phone_verified {
                return ContactCheck::Invalid(PHONE_NOT_VERIFIED);
            }
            let normalized = normalize_phone(phone);
            if E164_PHONE.is_match(&normalized) {
                ContactCheck::Valid(normalized)
            } else {
                ContactCheck::Invalid(INVALID_PHONE)
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
