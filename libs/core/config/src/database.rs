use crate::{env_parse, env_required, ConfigError, FromEnv};

/// Postgres connection settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 10,
            connect_timeout_secs: 8,
        }
    }
}

impl FromEnv for DatabaseConfig {
    /// Requires DATABASE_URL; pool settings come from DB_MAX_CONNECTIONS and
    /// DB_CONNECT_TIMEOUT_SECS
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", 10)?,
            connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT_SECS", 8)?,
        })
    }
}
