//! Health Check Module
//!
//! `/health` reports service identity and whether the user store answers a
//! ping. An unreachable store turns the response into a 503 so orchestrators
//! can take the instance out of rotation.

use crate::user::service::UserService;
use actix_web::{web, HttpResponse, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub backend: String,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub database: DatabaseStatus,
}

/// Convert duration to milliseconds, ensuring it fits in u64
fn safe_duration_to_ms(duration: std::time::Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

/// Ping the store and time the round trip
pub async fn check_database(service: &UserService) -> DatabaseStatus {
    let repository = service.repository();
    let start_time = Instant::now();
    let result = repository.ping().await;
    let response_time_ms = safe_duration_to_ms(start_time.elapsed());

    match result {
        Ok(()) => DatabaseStatus {
            backend: repository.backend().to_string(),
            status: HealthStatus::Healthy,
            response_time_ms,
            error: None,
        },
        Err(e) => DatabaseStatus {
            backend: repository.backend().to_string(),
            status: HealthStatus::Unhealthy,
            response_time_ms,
            error: Some(e.to_string()),
        },
    }
}

/// Health endpoint
pub async fn health(service: web::Data<UserService>) -> Result<HttpResponse> {
    let database = check_database(&service).await;
    let status = database.status.clone();

    let response = HealthResponse {
        status: status.clone(),
        service: crate::SERVICE_NAME.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
    };

    match status {
        HealthStatus::Healthy => Ok(HttpResponse::Ok().json(response)),
        HealthStatus::Unhealthy => {
            warn!(
                "Health check failed: {}",
                response.database.error.as_deref().unwrap_or("unknown error")
            );
            Ok(HttpResponse::ServiceUnavailable().json(response))
        },
    }
}
