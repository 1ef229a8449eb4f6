//! Error types for the notifications domain.

use thiserror::Error;
use uuid::Uuid;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while dispatching a notification.
///
/// None of these escape the dispatcher as a failed invocation on their own:
/// the orchestrator folds them into delivery attempt rows.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Provider credentials are missing. The message is recorded verbatim.
    #[error("{0}")]
    NotConfigured(String),

    /// The provider rejected the request or answered with an error body.
    #[error("{message}")]
    Provider {
        message: String,
        response: Option<serde_json::Value>,
    },

    /// The recipient's address was rejected before any network call.
    #[error("{0}")]
    InvalidRecipient(String),

    /// No profile exists for the recipient.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(Uuid),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    Template(String),

    /// Store (database) error.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotificationError {
    pub fn provider(message: impl Into<String>, response: Option<serde_json::Value>) -> Self {
        NotificationError::Provider {
            message: message.into(),
            response,
        }
    }

    /// Raw provider body, kept on the audit row for diagnosis.
    pub fn provider_response(&self) -> Option<serde_json::Value> {
        match self {
            NotificationError::Provider { response, .. } => response.clone(),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::Template(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Provider request timed out: {}", err)
        } else {
            format!("Provider request failed: {}", err)
        };
        NotificationError::provider(message, None)
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::Config(err.to_string())
    }
}
