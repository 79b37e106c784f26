//! User API handlers
//!
//! HTTP handler functions for the `/api/users` endpoints. Each handler
//! delegates to `UserService` and shapes the JSON envelope; failures render
//! through `UserError`'s `ResponseError` impl.

use actix_web::{web, HttpResponse};

use crate::user::{
    dto::{
        ListUsersQuery, MessageResponse, UserPayload, UserResponse, USER_CREATED_MESSAGE,
        USER_DELETED_MESSAGE, USER_UPDATED_MESSAGE,
    },
    error::UserError,
    service::UserService,
};

/// List users with pagination and search
///
/// Parameters are read from raw pairs so repeated keys never reject the request.
pub async fn list_users(
    service: web::Data<UserService>,
    pairs: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, UserError> {
    let query = ListUsersQuery::from_pairs(pairs.into_inner());
    let response = service.list_users(query.page_request(), &query.filter()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get a user by ID
pub async fn get_user(
    service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, UserError> {
    let user = service.get_user(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        message: None,
        data: user,
    }))
}

/// Create a user
pub async fn create_user(
    service: web::Data<UserService>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, UserError> {
    let user = service.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse {
        message: Some(USER_CREATED_MESSAGE.to_string()),
        data: user,
    }))
}

/// Replace a user's fields
pub async fn update_user(
    service: web::Data<UserService>,
    path: web::Path<String>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, UserError> {
    let user = service.update_user(&path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        message: Some(USER_UPDATED_MESSAGE.to_string()),
        data: user,
    }))
}

/// Delete a user
pub async fn delete_user(
    service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, UserError> {
    service.delete_user(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: USER_DELETED_MESSAGE.to_string(),
    }))
}

/// Render extractor failures (malformed JSON, bad query strings) as `{error}`
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    UserError::InvalidPayload(err.to_string()).into()
}

pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    UserError::InvalidPayload(err.to_string()).into()
}
