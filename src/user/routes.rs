//! User management routes
//!
//! Configuration of all user-related HTTP endpoints.

use crate::user::handlers;
use actix_web::{web, Scope};

/// Configure user management routes
pub fn configure_user_routes() -> Scope {
    web::scope("/api/users")
        // List users with pagination and search
        .route("", web::get().to(handlers::list_users))
        // Create a user
        .route("", web::post().to(handlers::create_user))
        // Get user by ID
        .route("/{id}", web::get().to(handlers::get_user))
        // Replace user fields
        .route("/{id}", web::put().to(handlers::update_user))
        // Delete a user
        .route("/{id}", web::delete().to(handlers::delete_user))
}

/// Extractor configuration shared by the user routes
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(handlers::query_error_handler));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryUserRepository;
    use crate::user::service::UserService;
    use actix_web::{test as actix_test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_routes_configuration() {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(configure_extractors)
                .service(configure_user_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/users").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // Unknown ids reach the handler rather than the router's 404
        let req = actix_test::TestRequest::delete().uri("/api/users/unknown").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "Không tìm thấy người dùng");
    }

    #[actix_web::test]
    async fn test_unsupported_method() {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(service)).service(configure_user_routes()),
        )
        .await;

        let req = actix_test::TestRequest::patch().uri("/api/users").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
