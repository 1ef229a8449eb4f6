use core_config::{
    AppInfo, FromEnv, app_info, database::DatabaseConfig, server::ServerConfig,
};
use domain_notifications::DispatcherConfig;

pub use core_config::Environment;

/// Dispatcher service configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dispatcher: DispatcherConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = DatabaseConfig::from_env()?; // DATABASE_URL is required
        let server = ServerConfig::from_env()?;
        let dispatcher = DispatcherConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            database,
            dispatcher,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/rallia")),
                ("PORT", Some("9000")),
                ("APP_ENV", Some("production")),
                ("APP_BASE_URL", Some("https://staging.rallia.app")),
                ("RESEND_API_KEY", Some("re_123")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "rallia_notification_dispatcher");
                assert_eq!(config.server.port(), 9000);
                assert!(config.environment.is_production());
                assert_eq!(config.dispatcher.app_base_url, "https://staging.rallia.app");
                assert_eq!(config.dispatcher.resend.api_key.as_deref(), Some("re_123"));
            },
        );
    }
}
