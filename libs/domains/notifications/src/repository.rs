//! Store traits the dispatcher reads from and writes to, plus in-memory
//! implementations for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{ChannelPreference, ContactInfo, DeliveryAttempt, OrganizationInfo};

/// Read-only access to explicit channel preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preference rows set by a user.
    async fn user_preferences(&self, user_id: Uuid) -> NotificationResult<Vec<ChannelPreference>>;

    /// Preference rows set by an organization.
    async fn organization_preferences(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Vec<ChannelPreference>>;
}

/// Contact snapshot for a recipient, read once per dispatch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Errors with [`NotificationError::RecipientNotFound`] when no profile exists.
    async fn contact_info(&self, user_id: Uuid) -> NotificationResult<ContactInfo>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn organization(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Option<OrganizationInfo>>;
}

/// Append-only delivery audit log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryAttemptStore: Send + Sync {
    async fn insert(&self, attempt: DeliveryAttempt) -> NotificationResult<()>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    users: Arc<RwLock<HashMap<Uuid, Vec<ChannelPreference>>>>,
    organizations: Arc<RwLock<HashMap<Uuid, Vec<ChannelPreference>>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_user_preference(&self, user_id: Uuid, preference: ChannelPreference) {
        self.users
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(preference);
    }

    pub async fn set_organization_preference(
        &self,
        organization_id: Uuid,
        preference: ChannelPreference,
    ) {
        self.organizations
            .write()
            .await
            .entry(organization_id)
            .or_default()
            .push(preference);
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn user_preferences(&self, user_id: Uuid) -> NotificationResult<Vec<ChannelPreference>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned().unwrap_or_default())
    }

    async fn organization_preferences(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Vec<ChannelPreference>> {
        let organizations = self.organizations.read().await;
        Ok(organizations
            .get(&organization_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<HashMap<Uuid, ContactInfo>>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: Uuid, contact: ContactInfo) {
        self.contacts.write().await.insert(user_id, contact);
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn contact_info(&self, user_id: Uuid) -> NotificationResult<ContactInfo> {
        let contacts = self.contacts.read().await;
        contacts
            .get(&user_id)
            .cloned()
            .ok_or(NotificationError::RecipientNotFound(user_id))
    }
}

#[derive(Default)]
pub struct InMemoryOrganizationStore {
    organizations: Arc<RwLock<HashMap<Uuid, OrganizationInfo>>>,
}

impl InMemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, organization: OrganizationInfo) {
        self.organizations
            .write()
            .await
            .insert(organization.id, organization);
    }
}

#[async_trait]
impl OrganizationStore for InMemoryOrganizationStore {
    async fn organization(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Option<OrganizationInfo>> {
        let organizations = self.organizations.read().await;
        Ok(organizations.get(&organization_id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDeliveryAttemptStore {
    attempts: Arc<RwLock<Vec<DeliveryAttempt>>>,
}

impl InMemoryDeliveryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every attempt written so far, in insertion order.
    pub async fn attempts(&self) -> Vec<DeliveryAttempt> {
        self.attempts.read().await.clone()
    }

    pub async fn attempts_for(&self, notification_id: Uuid) -> Vec<DeliveryAttempt> {
        self.attempts
            .read()
            .await
            .iter()
            .filter(|a| a.notification_id == notification_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DeliveryAttemptStore for InMemoryDeliveryAttemptStore {
    async fn insert(&self, attempt: DeliveryAttempt) -> NotificationResult<()> {
        tracing::debug!(
            notification_id = %attempt.notification_id,
            attempt_number = attempt.attempt_number,
            channel = %attempt.channel,
            status = %attempt.status,
            "Recorded delivery attempt"
        );
        self.attempts.write().await.push(attempt);
        Ok(())
    }
}
