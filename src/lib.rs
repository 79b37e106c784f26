//! User Directory Service
//!
//! A user management REST API built with Actix-web. Users are stored in
//! MongoDB, PostgreSQL or memory, and listed with pagination and search.

pub mod config;
pub mod database;
pub mod health;
pub mod mocks;
pub mod mongo;
pub mod postgres;
pub mod types;
pub mod user;

use actix_web::web;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "user-directory";

/// Register extractor settings, the health probe and the user API
///
/// Expects a `web::Data<UserService>` to be registered on the app.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    user::routes::configure_extractors(cfg);
    cfg.route("/health", web::get().to(health::health))
        .service(user::routes::configure_user_routes());
}
