//! Delivery orchestration.
//!
//! One call handles one notification: pick personal or organization scope,
//! resolve channels, fetch contact info once, then walk email, push and sms
//! in that order. Every channel ends up as exactly one audit row whatever
//! happened to it, numbered 1..=3 within the call. Nothing is retried.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::DispatcherConfig;
use crate::contact::{ContactCheck, validate_contact};
use crate::error::{NotificationError, NotificationResult};
use crate::formatters::{AppLinks, format_email, format_push, format_sms};
use crate::models::{
    Channel, ChannelOutcome, DeliveryAttempt, DeliveryStatus, Notification, OrganizationInfo,
};
use crate::preferences::{PreferenceMap, resolve_channels};
use crate::repository::{ContactStore, DeliveryAttemptStore, OrganizationStore, PreferenceStore};
use crate::templates::TemplateEngine;
use crate::transports::{
    EmailTransport, ExpoPushTransport, PushTransport, Receipt, ResendEmailTransport, SmsTransport,
    TwilioSmsTransport, http_client,
};

pub const PREFERENCE_DISABLED: &str = "Channel disabled by preference";

/// Whose preferences (and branding) apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "organization_id", rename_all = "snake_case")]
pub enum DispatchMode {
    Personal,
    Organization(Uuid),
}

impl DispatchMode {
    /// Organization mode needs both an organization id in the payload and an
    /// organization-scoped type.
    pub fn for_notification(notification: &Notification) -> Self {
        match notification.organization_id() {
            Some(org_id) if notification.notification_type.is_organization_scoped() => {
                DispatchMode::Organization(org_id)
            }
            _ => DispatchMode::Personal,
        }
    }
}

/// What one invocation did.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub notification_id: Uuid,
    pub mode: DispatchMode,
    /// One per channel, in attempt order.
    pub attempts: Vec<DeliveryAttempt>,
}

impl DispatchReport {
    pub fn attempt(&self, channel: Channel) -> Option<&DeliveryAttempt> {
        self.attempts.iter().find(|a| a.channel == channel)
    }
}

/// Entry-point seam over the dispatcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Deliver on every channel and record the attempts.
    ///
    /// Errors only when not a single attempt could be recorded.
    async fn dispatch(&self, notification: &Notification) -> NotificationResult<DispatchReport>;
}

/// Stores the dispatcher reads from and appends to.
#[derive(Clone)]
pub struct Stores {
    pub preferences: Arc<dyn PreferenceStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub attempts: Arc<dyn DeliveryAttemptStore>,
}

#[derive(Clone)]
pub struct Transports {
    pub email: Arc<dyn EmailTransport>,
    pub push: Arc<dyn PushTransport>,
    pub sms: Arc<dyn SmsTransport>,
}

impl Transports {
    /// Resend, Expo and Twilio sharing one HTTP client.
    pub fn from_config(config: &DispatcherConfig) -> NotificationResult<Self> {
        let client = http_client(config.provider_timeout_secs)?;
        Ok(Self {
            email: Arc::new(ResendEmailTransport::new(
                config.resend.clone(),
                client.clone(),
            )),
            push: Arc::new(ExpoPushTransport::new(config.expo.clone(), client.clone())),
            sms: Arc::new(TwilioSmsTransport::new(config.twilio.clone(), client)),
        })
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    stores: Stores,
    transports: Transports,
    templates: TemplateEngine,
    links: AppLinks,
}

impl NotificationDispatcher {
    pub fn new(
        stores: Stores,
        transports: Transports,
        templates: TemplateEngine,
        links: AppLinks,
    ) -> Self {
        Self {
            stores,
            transports,
            templates,
            links,
        }
    }

    /// Dispatcher with the production transports.
    pub fn from_config(stores: Stores, config: &DispatcherConfig) -> NotificationResult<Self> {
        Ok(Self::new(
            stores,
            Transports::from_config(config)?,
            TemplateEngine::new()?,
            AppLinks::new(config.app_base_url.clone()),
        ))
    }

    async fn load_organization(&self, mode: DispatchMode) -> Option<OrganizationInfo> {
        let DispatchMode::Organization(org_id) = mode else {
            return None;
        };
        match self.stores.organizations.organization(org_id).await {
            Ok(Some(organization)) => Some(organization),
            Ok(None) => {
                warn!(organization_id = %org_id, "Organization not found; sending unbranded");
                None
            }
            Err(err) => {
                warn!(organization_id = %org_id, error = %err, "Failed to fetch organization; sending unbranded");
                None
            }
        }
    }

    /// Explicit preferences for the mode. A failed read falls back to defaults.
    async fn load_preferences(&self, mode: DispatchMode, user_id: Uuid) -> PreferenceMap {
        let rows = match mode {
            DispatchMode::Personal => self.stores.preferences.user_preferences(user_id).await,
            DispatchMode::Organization(org_id) => {
                self.stores
                    .preferences
                    .organization_preferences(org_id)
                    .await
            }
        };

        match rows {
            Ok(rows) => rows.into_iter().collect(),
            Err(err) => {
                warn!(?mode, error = %err, "Failed to fetch preferences; using defaults");
                PreferenceMap::new()
            }
        }
    }

    async fn send(
        &self,
        channel: Channel,
        address: &str,
        notification: &Notification,
        organization: Option<&OrganizationInfo>,
    ) -> NotificationResult<Receipt> {
        match channel {
            Channel::Email => {
                let email = format_email(notification, organization, &self.templates, &self.links)?;
                self.transports.email.send(address, &email).await
            }
            Channel::Push => {
                let push = format_push(notification);
                self.transports.push.send(address, &push).await
            }
            Channel::Sms => {
                let sms = format_sms(notification);
                self.transports.sms.send(address, &sms).await
            }
        }
    }

    async fn deliver(
        &self,
        channel: Channel,
        address: &str,
        notification: &Notification,
        organization: Option<&OrganizationInfo>,
    ) -> ChannelOutcome {
        match self.send(channel, address, notification, organization).await {
            Ok(receipt) => ChannelOutcome::success(Some(receipt)),
            Err(err) => {
                warn!(%channel, error = %err, "Channel delivery failed");
                ChannelOutcome::failed(err.to_string(), err.provider_response())
            }
        }
    }

    /// Write the attempt rows. Write failures are logged and not retried.
    async fn record(
        &self,
        notification: &Notification,
        mode: DispatchMode,
        outcomes: Vec<(Channel, ChannelOutcome)>,
    ) -> NotificationResult<DispatchReport> {
        let mut attempts = Vec::with_capacity(outcomes.len());
        let mut recorded = 0;

        for (number, (channel, outcome)) in (1..).zip(outcomes) {
            let attempt = DeliveryAttempt::new(notification.id, number, channel, outcome);
            match self.stores.attempts.insert(attempt.clone()).await {
                Ok(()) => recorded += 1,
                Err(err) => error!(
                    attempt_number = number,
                    %channel,
                    error = %err,
                    "Failed to record delivery attempt"
                ),
            }
            attempts.push(attempt);
        }

        if recorded == 0 {
            return Err(NotificationError::Database(
                "No delivery attempt could be recorded".to_string(),
            ));
        }

        info!(
            sent = attempts.iter().filter(|a| a.status == DeliveryStatus::Success).count(),
            failed = attempts.iter().filter(|a| a.status == DeliveryStatus::Failed).count(),
            recorded,
            "Notification dispatched"
        );

        Ok(DispatchReport {
            notification_id: notification.id,
            mode,
            attempts,
        })
    }
}

#[async_trait]
impl Dispatch for NotificationDispatcher {
    #[instrument(
        skip(self, notification),
        fields(notification_id = %notification.id, notification_type = %notification.notification_type)
    )]
    async fn dispatch(&self, notification: &Notification) -> NotificationResult<DispatchReport> {
        let mode = DispatchMode::for_notification(notification);
        let organization = self.load_organization(mode).await;
        let preferences = self.load_preferences(mode, notification.user_id).await;
        let enabled = resolve_channels(&preferences, notification.notification_type);
        debug!(?mode, ?enabled, "Resolved channels");

        let contact = match self.stores.contacts.contact_info(notification.user_id).await {
            Ok(contact) => contact,
            Err(err) => {
                warn!(user_id = %notification.user_id, error = %err, "Failed to fetch contact info");
                let reason = format!("Failed to fetch contact info: {}", err);
                let outcomes = Channel::ALL
                    .into_iter()
                    .map(|channel| (channel, ChannelOutcome::failed(reason.clone(), None)))
                    .collect();
                return self.record(notification, mode, outcomes).await;
            }
        };

        let mut outcomes = Vec::with_capacity(Channel::ALL.len());
        for channel in Channel::ALL {
            let outcome = if !enabled.contains(&channel) {
                ChannelOutcome::skipped(DeliveryStatus::SkippedPreference, PREFERENCE_DISABLED)
            } else {
                match validate_contact(channel, &contact) {
                    ContactCheck::Invalid(reason) => {
                        ChannelOutcome::skipped(DeliveryStatus::SkippedMissingContact, reason)
                    }
                    ContactCheck::Valid(address) => {
                        self.deliver(channel, &address, notification, organization.as_ref())
                            .await
                    }
                }
            };
            outcomes.push((channel, outcome));
        }

        self.record(notification, mode, outcomes).await
    }
}
