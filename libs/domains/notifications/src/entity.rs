use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{Channel, ChannelPreference, NotificationType};

/// Parse a stored (type, channel, enabled) row; `None` for unknown values.
fn parse_preference(
    notification_type: &str,
    channel: &str,
    enabled: bool,
) -> Option<ChannelPreference> {
    Some(ChannelPreference::new(
        notification_type.parse::<NotificationType>().ok()?,
        channel.parse::<Channel>().ok()?,
        enabled,
    ))
}

// ===== Profile Entity =====

pub mod profile {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "profile")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text", nullable)]
        pub email: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(32))", nullable)]
        pub phone: Option<String>,
        pub phone_verified: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::player::Entity")]
        Player,
    }

    impl Related<super::player::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Player.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// ===== Player Entity =====

pub mod player {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "player")]
    pub struct Model {
        /// Same id as the owning profile.
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text", nullable)]
        pub expo_push_token: Option<String>,
        pub push_notifications_enabled: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::profile::Entity",
            from = "Column::Id",
            to = "super::profile::Column::Id"
        )]
        Profile,
    }

    impl Related<super::profile::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Profile.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// ===== Organization Entity =====

pub mod organization {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "organization")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub name: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub email: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub website: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::OrganizationInfo {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                email: model.email,
                website: model.website,
            }
        }
    }
}

// ===== User Notification Preference Entity =====

pub mod notification_preference {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "notification_preference")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(64))")]
        pub notification_type: String,
        #[sea_orm(column_type = "String(StringLen::N(16))")]
        pub channel: String,
        pub enabled: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub fn to_preference(&self) -> Option<ChannelPreference> {
            parse_preference(&self.notification_type, &self.channel, self.enabled)
        }
    }
}

// ===== Organization Notification Preference Entity =====

pub mod organization_notification_preference {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "organization_notification_preference")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub organization_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(64))")]
        pub notification_type: String,
        #[sea_orm(column_type = "String(StringLen::N(16))")]
        pub channel: String,
        pub enabled: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::organization::Entity",
            from = "Column::OrganizationId",
            to = "super::organization::Column::Id"
        )]
        Organization,
    }

    impl Related<super::organization::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Organization.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub fn to_preference(&self) -> Option<ChannelPreference> {
            parse_preference(&self.notification_type, &self.channel, self.enabled)
        }
    }
}

// ===== Delivery Attempt Entity =====

pub mod delivery_attempt {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "delivery_attempt")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub notification_id: Uuid,
        pub attempt_number: i32,
        #[sea_orm(column_type = "String(StringLen::N(16))")]
        pub channel: String,
        #[sea_orm(column_type = "String(StringLen::N(32))")]
        pub status: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub error_message: Option<String>,
        #[sea_orm(column_type = "JsonBinary", nullable)]
        pub provider_response: Option<serde_json::Value>,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<crate::models::DeliveryAttempt> for ActiveModel {
        fn from(attempt: crate::models::DeliveryAttempt) -> Self {
            ActiveModel {
                id: Set(attempt.id),
                notification_id: Set(attempt.notification_id),
                attempt_number: Set(attempt.attempt_number),
                channel: Set(attempt.channel.to_string()),
                status: Set(attempt.status.to_string()),
                error_message: Set(attempt.error_message),
                provider_response: Set(attempt.provider_response),
                created_at: Set(attempt.created_at.into()),
            }
        }
    }
}
