//! Type definitions for user_directory
//!
//! Contains the startup error type and the configuration models used by
//! the binary.

use std::time::Duration;
use thiserror::Error;

/// Application startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database connection error: {0}")]
    Database(String),
    #[error("Server binding error: {0}")]
    ServerBind(String),
}

/// Complete app configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// MongoDB database used when the URI names none
    pub database_name: String,
    pub max_connections: usize,
    pub server: ServerConfig,
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub keep_alive: Duration,
}

impl AppConfig {
    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "memory://".to_string(),
            database_name: "user_directory".to_string(),
            max_connections: crate::postgres::config::DEFAULT_MAX_CONNECTIONS,
            server: ServerConfig::default(),
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: std::thread::available_parallelism().map(usize::from).unwrap_or(1),
            keep_alive: Duration::from_secs(30),
        }
    }
}
