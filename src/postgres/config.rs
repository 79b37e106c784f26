//! PostgreSQL connection pool configuration and setup
//!
//! This module handles the creation and configuration of a connection pool
//! for PostgreSQL database access.

use deadpool_postgres::{Config, CreatePoolError, Pool, PoolConfig, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

/// Default values for database configuration
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Creates a PostgreSQL connection pool from a connection URL
///
/// The pool is lazy: no connection is opened until the first checkout.
pub fn create_pool(database_url: &str, max_connections: usize) -> Result<Pool, CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.pool = Some(PoolConfig::new(max_connections));
    cfg.connect_timeout = Some(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Checks if the database connection is working
pub async fn health_check(pool: &Pool) -> Result<(), String> {
    let client =
        pool.get().await.map_err(|e| format!("Failed to get database connection: {}", e))?;

    client
        .query_one("SELECT 1", &[])
        .await
        .map_err(|e| format!("Database health check failed: {}", e))?;

    Ok(())
}
