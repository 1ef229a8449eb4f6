//! Provider and link configuration for the dispatcher.

use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};

/// Resend (email) settings. A missing key disables the channel.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
    pub api_url: String,
}

impl ResendConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.resend.com";

    /// `Name <address>` sender header.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: "notifications@rallia.app".to_string(),
            from_name: "Rallia".to_string(),
            api_url: Self::DEFAULT_API_URL.to_string(),
        }
    }
}

impl FromEnv for ResendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_optional("RESEND_API_KEY"),
            from_email: env_or_default("EMAIL_FROM", &defaults.from_email),
            from_name: env_or_default("EMAIL_FROM_NAME", &defaults.from_name),
            api_url: defaults.api_url,
        })
    }
}

/// Expo push settings. The access token is optional on Expo's side.
#[derive(Debug, Clone)]
pub struct ExpoConfig {
    pub access_token: Option<String>,
    pub api_url: String,
}

impl ExpoConfig {
    pub const DEFAULT_API_URL: &'static str = "https://exp.host/--/api/v2/push/send";
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_url: Self::DEFAULT_API_URL.to_string(),
        }
    }
}

impl FromEnv for ExpoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_token: env_optional("EXPO_ACCESS_TOKEN"),
            ..Self::default()
        })
    }
}

/// Twilio SMS settings. All three credentials are needed to send.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    pub api_url: String,
}

impl TwilioConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.twilio.com";

    /// `(sid, token, from)` when fully configured.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.account_sid.as_deref()?,
            self.auth_token.as_deref()?,
            self.from_number.as_deref()?,
        ))
    }
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: None,
            api_url: Self::DEFAULT_API_URL.to_string(),
        }
    }
}

impl FromEnv for TwilioConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            account_sid: env_optional("TWILIO_ACCOUNT_SID"),
            auth_token: env_optional("TWILIO_AUTH_TOKEN"),
            from_number: env_optional("TWILIO_PHONE_NUMBER"),
            ..Self::default()
        })
    }
}

/// Everything the dispatcher needs besides its stores.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Base for deep links in emails.
    pub app_base_url: String,
    pub resend: ResendConfig,
    pub expo: ExpoConfig,
    pub twilio: TwilioConfig,
    /// Bound on every outbound provider call.
    pub provider_timeout_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            app_base_url: "https://rallia.app".to_string(),
            resend: ResendConfig::default(),
            expo: ExpoConfig::default(),
            twilio: TwilioConfig::default(),
            provider_timeout_secs: 10,
        }
    }
}

impl FromEnv for DispatcherConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            app_base_url: env_or_default("APP_BASE_URL", &defaults.app_base_url),
            resend: ResendConfig::from_env()?,
            expo: ExpoConfig::from_env()?,
            twilio: TwilioConfig::from_env()?,
            provider_timeout_secs: env_parse(
                "PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout_secs,
            )?,
        })
    }
}
