//! Store selection and connection
//!
//! The scheme of the configured URL picks the backend; the chosen store is
//! prepared (schema or indexes) and checked before the server accepts traffic.

use crate::mocks::InMemoryUserRepository;
use crate::mongo::{self, MongoUserRepository};
use crate::postgres::{config::create_pool, PgUserRepository};
use crate::types::{AppConfig, StartupError};
use crate::user::repository::UserRepository;
use log::info;
use std::sync::Arc;

/// Supported user stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Mongo,
    Memory,
}

impl StoreKind {
    /// Detect the backend from a connection URL's scheme
    pub fn from_url(url: &str) -> Result<Self, StartupError> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase());

        match scheme.as_deref() {
            Some("postgres" | "postgresql") => Ok(StoreKind::Postgres),
            Some("mongodb" | "mongodb+srv") => Ok(StoreKind::Mongo),
            Some("memory") => Ok(StoreKind::Memory),
            _ => Err(StartupError::Config(format!(
                "Unsupported database URL scheme in '{}'",
                crate::config::mask_sensitive_url(url)
            ))),
        }
    }
}

/// Open the configured store and make it ready for use
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn UserRepository>, StartupError> {
    let repository: Arc<dyn UserRepository> = match StoreKind::from_url(&config.database_url)? {
        StoreKind::Postgres => {
            let pool = create_pool(&config.database_url, config.max_connections)
                .map_err(|e| StartupError::Database(format!("Failed to create pool: {e}")))?;
            let repository = PgUserRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .map_err(|e| StartupError::Database(format!("Failed to prepare schema: {e}")))?;
            Arc::new(repository)
        },
        StoreKind::Mongo => {
            let pool_size = u32::try_from(config.max_connections).unwrap_or(u32::MAX);
            let database = mongo::connect(&config.database_url, &config.database_name, pool_size)
                .await
                .map_err(|e| StartupError::Database(e.to_string()))?;
            let repository = MongoUserRepository::new(&database);
            repository
                .ensure_indexes()
                .await
                .map_err(|e| StartupError::Database(format!("Failed to create indexes: {e}")))?;
            Arc::new(repository)
        },
        StoreKind::Memory => Arc::new(InMemoryUserRepository::new()),
    };

    repository
        .ping()
        .await
        .map_err(|e| StartupError::Database(format!("Connection test failed: {e}")))?;

    info!("Database connection established ({} backend)", repository.backend());
    Ok(repository)
}
