use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::warn;
use uuid::Uuid;

use crate::{
    entity::{
        delivery_attempt, notification_preference, organization,
        organization_notification_preference, player, profile,
    },
    error::{NotificationError, NotificationResult},
    models::{ChannelPreference, ContactInfo, DeliveryAttempt, OrganizationInfo},
    repository::{ContactStore, DeliveryAttemptStore, OrganizationStore, PreferenceStore},
};

/// Keep rows that parse; log and drop the rest.
fn parsed_preferences<I>(rows: I, owner_id: Uuid) -> Vec<ChannelPreference>
where
    I: IntoIterator<Item = (Uuid, Option<ChannelPreference>)>,
{
    rows.into_iter()
        .filter_map(|(row_id, preference)| {
            if preference.is_none() {
                warn!(%owner_id, %row_id, "Ignoring preference row with unknown type or channel");
            }
            preference
        })
        .collect()
}

pub struct PgPreferenceStore {
    db: DatabaseConnection,
}

impl PgPreferenceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn user_preferences(&self, user_id: Uuid) -> NotificationResult<Vec<ChannelPreference>> {
        let rows = notification_preference::Entity::find()
            .filter(notification_preference::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(parsed_preferences(
            rows.iter().map(|row| (row.id, row.to_preference())),
            user_id,
        ))
    }

    async fn organization_preferences(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Vec<ChannelPreference>> {
        let rows = organization_notification_preference::Entity::find()
            .filter(organization_notification_preference::Column::OrganizationId.eq(organization_id))
            .all(&self.db)
            .await?;

        Ok(parsed_preferences(
            rows.iter().map(|row| (row.id, row.to_preference())),
            organization_id,
        ))
    }
}

pub struct PgContactStore {
    db: DatabaseConnection,
}

impl PgContactStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn contact_info(&self, user_id: Uuid) -> NotificationResult<ContactInfo> {
        let profile = profile::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(NotificationError::RecipientNotFound(user_id))?;

        // Users who never opened the mobile app have no player row.
        let player = player::Entity::find_by_id(user_id).one(&self.db).await?;

        Ok(ContactInfo {
            email: profile.email,
            phone: profile.phone,
            phone_verified: profile.phone_verified,
            push_token: player.as_ref().and_then(|p| p.expo_push_token.clone()),
            push_enabled: player.is_some_and(|p| p.push_notifications_enabled),
        })
    }
}

pub struct PgOrganizationStore {
    db: DatabaseConnection,
}

impl PgOrganizationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn organization(
        &self,
        organization_id: Uuid,
    ) -> NotificationResult<Option<OrganizationInfo>> {
        let model = organization::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }
}

pub struct PgDeliveryAttemptStore {
    db: DatabaseConnection,
}

impl PgDeliveryAttemptStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryAttemptStore for PgDeliveryAttemptStore {
    async fn insert(&self, attempt: DeliveryAttempt) -> NotificationResult<()> {
        let active: delivery_attempt::ActiveModel = attempt.into();
        delivery_attempt::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
