//! Channel preference resolution.
//!
//! Explicit rows win outright; anything without a row falls back to the
//! compiled-in default for the notification type. The resolver does not care
//! whether the rows came from a user or an organization.

use crate::models::{Channel, ChannelPreference, NotificationType};
use std::collections::{BTreeSet, HashMap};

/// Default enablement of each channel for one notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDefaults {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl ChannelDefaults {
    const fn new(email: bool, push: bool, sms: bool) -> Self {
        Self { email, push, sms }
    }

    pub fn get(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Push => self.push,
            Channel::Sms => self.sms,
        }
    }
}

/// Static default table. The match is exhaustive, so adding a type without
/// a row does not compile.
pub const fn default_channels(notification_type: NotificationType) -> ChannelDefaults {
    use NotificationType::*;
    match notification_type {
        MatchInvitation => ChannelDefaults::new(true, true, false),
        MatchJoinRequest => ChannelDefaults::new(false, true, false),
        MatchJoinAccepted => ChannelDefaults::new(true, true, false),
        MatchJoinRejected => ChannelDefaults::new(false, true, false),
        MatchPlayerJoined => ChannelDefaults::new(false, true, false),
        MatchCancelled => ChannelDefaults::new(true, true, true),
        MatchUpdated => ChannelDefaults::new(true, true, false),
        MatchStartingSoon => ChannelDefaults::new(false, true, true),
        MatchCompleted => ChannelDefaults::new(false, true, false),
        PlayerKicked => ChannelDefaults::new(true, true, false),
        PlayerLeft => ChannelDefaults::new(false, true, false),
        Reminder => ChannelDefaults::new(false, true, false),
        NewMessage => ChannelDefaults::new(false, true, false),
        Chat => ChannelDefaults::new(false, true, false),
        FriendRequest => ChannelDefaults::new(false, true, false),
        RatingReceived => ChannelDefaults::new(false, true, false),
        FeedbackRequest => ChannelDefaults::new(true, true, false),
        FeedbackReminder => ChannelDefaults::new(false, true, false),
        ScoreConfirmation => ChannelDefaults::new(false, true, false),
        Payment => ChannelDefaults::new(true, true, false),
        Support => ChannelDefaults::new(true, false, false),
        System => ChannelDefaults::new(true, true, false),
        BookingCreated => ChannelDefaults::new(true, true, false),
        BookingConfirmed => ChannelDefaults::new(true, true, false),
        BookingReminder => ChannelDefaults::new(true, true, false),
        BookingModified => ChannelDefaults::new(true, true, false),
        BookingCancelledByPlayer => ChannelDefaults::new(true, true, false),
        BookingCancelledByOrg => ChannelDefaults::new(true, true, true),
        NewMemberJoined => ChannelDefaults::new(true, false, false),
        MemberLeft => ChannelDefaults::new(true, false, false),
        MemberRoleChanged => ChannelDefaults::new(true, false, false),
        MembershipApproved => ChannelDefaults::new(true, true, false),
        PaymentReceived => ChannelDefaults::new(true, false, false),
        PaymentFailed => ChannelDefaults::new(true, true, true),
        RefundProcessed => ChannelDefaults::new(true, false, false),
        DailySummary => ChannelDefaults::new(true, false, false),
        WeeklyReport => ChannelDefaults::new(true, false, false),
    }
}

/// Explicit preferences keyed by exact (type, channel) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceMap {
    entries: HashMap<(NotificationType, Channel), bool>,
}

impl PreferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, notification_type: NotificationType, channel: Channel, enabled: bool) {
        self.entries.insert((notification_type, channel), enabled);
    }

    pub fn get(&self, notification_type: NotificationType, channel: Channel) -> Option<bool> {
        self.entries.get(&(notification_type, channel)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ChannelPreference> for PreferenceMap {
    /// Later rows for the same pair replace earlier ones.
    fn from_iter<I: IntoIterator<Item = ChannelPreference>>(iter: I) -> Self {
        let mut map = PreferenceMap::new();
        for pref in iter {
            map.set(pref.notification_type, pref.channel, pref.enabled);
        }
        map
    }
}

/// Channels considered enabled for one notification, in processing order.
pub type EnabledChannels = BTreeSet<Channel>;

/// Resolve the enabled channel set for `notification_type`.
pub fn resolve_channels(
    preferences: &PreferenceMap,
    notification_type: NotificationType,
) -> EnabledChannels {
    let defaults = default_channels(notification_type);

    Channel::ALL
        .into_iter()
        .filter(|&channel| {
            preferences
                .get(notification_type, channel)
                .unwrap_or_else(|| defaults.get(channel))
        })
        .collect()
}
