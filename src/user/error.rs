//! User-related error types

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use mongodb::error::{ErrorKind, WriteFailure};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Server code reported by MongoDB for unique index violations
const MONGO_DUPLICATE_KEY: i32 = 11000;

/// Field order used when summarising validation failures
const VALIDATED_FIELDS: [&str; 3] = ["name", "age", "email"];

/// Standard error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// User-specific errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Không tìm thấy người dùng")]
    UserNotFound,

    #[error("Email đã tồn tại trong hệ thống")]
    EmailExists,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Database(String),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::EmailExists => StatusCode::BAD_REQUEST,
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}

impl From<tokio_postgres::Error> for UserError {
    fn from(error: tokio_postgres::Error) -> Self {
        match error.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => UserError::EmailExists,
            _ => UserError::Database(error.to_string()),
        }
    }
}

impl From<deadpool_postgres::PoolError> for UserError {
    fn from(error: deadpool_postgres::PoolError) -> Self {
        UserError::Database(error.to_string())
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(error: mongodb::error::Error) -> Self {
        let duplicate = match error.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
                write_error.code == MONGO_DUPLICATE_KEY
            },
            ErrorKind::Command(command_error) => command_error.code == MONGO_DUPLICATE_KEY,
            _ => false,
        };

        if duplicate {
            UserError::EmailExists
        } else {
            UserError::Database(error.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let error_messages: Vec<String> = VALIDATED_FIELDS
            .iter()
            .filter_map(|field| field_errors.get(*field).map(|errors| (*field, errors)))
            .filter_map(|(field, errors)| {
                errors.first().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string);
                    format!("{field}: {message}")
                })
            })
            .collect();

        UserError::Validation(format!("User validation failed: {}", error_messages.join(", ")))
    }
}
