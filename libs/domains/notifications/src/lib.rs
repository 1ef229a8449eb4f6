//! Notifications Domain
//!
//! Delivers a persisted notification to its recipient over email, push and
//! SMS, honouring user or organization channel preferences, and records one
//! delivery attempt per channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handler   │  ← trigger envelope or bare record
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Dispatcher    │  ← mode, preferences, contact checks
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Formatters    │  ← email / push / sms content
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Transports    │  ← Resend, Expo, Twilio
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Delivery audit  │  ← delivery_attempt rows
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{DispatcherConfig, NotificationDispatcher, Stores, handlers};
//!
//! let dispatcher = NotificationDispatcher::from_config(stores, &DispatcherConfig::from_env()?)?;
//! let app = handlers::router(dispatcher);
//! ```

pub mod config;
pub mod contact;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod formatters;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod preferences;
pub mod repository;
pub mod templates;
pub mod transports;

// Re-export commonly used types
pub use config::{DispatcherConfig, ExpoConfig, ResendConfig, TwilioConfig};
pub use dispatcher::{
    Dispatch, DispatchMode, DispatchReport, NotificationDispatcher, Stores, Transports,
};
pub use error::{NotificationError, NotificationResult};
pub use handlers::ApiDoc;
pub use models::{
    Channel, ChannelPreference, ContactInfo, DeliveryAttempt, DeliveryStatus, Notification,
    NotificationPriority, NotificationType, OrganizationInfo,
};
pub use postgres::{PgContactStore, PgDeliveryAttemptStore, PgOrganizationStore, PgPreferenceStore};
pub use repository::{
    ContactStore, DeliveryAttemptStore, InMemoryContactStore, InMemoryDeliveryAttemptStore,
    InMemoryOrganizationStore, InMemoryPreferenceStore, OrganizationStore, PreferenceStore,
};
pub use templates::TemplateEngine;
pub use transports::{EmailTransport, PushTransport, SmsTransport};
