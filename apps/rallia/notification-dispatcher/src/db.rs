use core_config::database::DatabaseConfig;
use domain_notifications::{
    PgContactStore, PgDeliveryAttemptStore, PgOrganizationStore, PgPreferenceStore, Stores,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY_MS: u64 = 250;
const MAX_RETRY_DELAY_MS: u64 = 4_000;

fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    options
}

/// Connect to Postgres, retrying with exponential backoff.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let options = connect_options(config);
    let mut attempt = 0;
    let mut delay = INITIAL_RETRY_DELAY_MS;

    loop {
        attempt += 1;
        match Database::connect(options.clone()).await {
            Ok(db) => {
                info!(attempt, "Connected to PostgreSQL");
                return Ok(db);
            }
            Err(e) if attempt >= MAX_CONNECT_ATTEMPTS => {
                warn!("PostgreSQL connection failed after {} attempts: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "PostgreSQL connection failed (attempt {}/{}): {}. Retrying in {}ms...",
                    attempt, MAX_CONNECT_ATTEMPTS, e, delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
            }
        }
    }
}

/// Postgres-backed stores sharing one connection pool.
pub fn postgres_stores(db: DatabaseConnection) -> Stores {
    Stores {
        preferences: Arc::new(PgPreferenceStore::new(db.clone())),
        contacts: Arc::new(PgContactStore::new(db.clone())),
        organizations: Arc::new(PgOrganizationStore::new(db.clone())),
        attempts: Arc::new(PgDeliveryAttemptStore::new(db)),
    }
}
