//! Configuration management for user_directory
//!
//! Loads the app configuration from environment variables with defaults and
//! validates it before the server starts.

use crate::database::StoreKind;
use crate::types::{AppConfig, ServerConfig, StartupError};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Load complete app configuration from the process environment
pub fn load_config() -> Result<AppConfig, StartupError> {
    load_config_from(|key| env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = AppConfig::default();

    let config = AppConfig {
        database_url: lookup("DATABASE_URL")
            .or_else(|| lookup("MONGO_URI"))
            .unwrap_or(defaults.database_url),
        database_name: lookup("DATABASE_NAME").unwrap_or(defaults.database_name),
        max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
        server: load_server_config(&lookup, defaults.server)?,
        cors_origins: lookup("CORS_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or(defaults.cors_origins),
        log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
    };

    validate_config(&config)?;
    Ok(config)
}

/// Load server configuration
fn load_server_config<F>(lookup: &F, defaults: ServerConfig) -> Result<ServerConfig, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(ServerConfig {
        host: lookup("HOST").unwrap_or(defaults.host),
        port: parse_or(lookup, "PORT", defaults.port)?,
        workers: parse_or(lookup, "SERVER_WORKERS", defaults.workers)?,
        keep_alive: Duration::from_secs(parse_or(
            lookup,
            "SERVER_KEEP_ALIVE",
            defaults.keep_alive.as_secs(),
        )?),
    })
}

/// Parse a numeric variable, keeping `default` when it is unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, StartupError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            StartupError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.database_url.trim().is_empty() {
        return Err(StartupError::Config("Database URL can't be empty".to_string()));
    }

    StoreKind::from_url(&config.database_url)?;

    if config.server.port == 0 {
        return Err(StartupError::Config("Server port must be between 1 and 65,535".to_string()));
    }

    if config.server.workers == 0 {
        return Err(StartupError::Config("Server workers must be at least 1".to_string()));
    }

    if config.max_connections == 0 {
        return Err(StartupError::Config(
            "Database pool size must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Get bind address from configuration
pub fn get_bind_address(config: &AppConfig) -> String {
    format!("{}:{}", config.server.host, config.server.port)
}

/// Hide credentials in a connection URL before logging it
pub fn mask_sensitive_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        let (before_at, after_at) = url.split_at(at_pos);
        if let Some(protocol_end) = before_at.find("://") {
            let protocol = &before_at[..protocol_end + 3];
            return format!("{}***{}", protocol, after_at);
        }
    }
    url.to_string()
}
