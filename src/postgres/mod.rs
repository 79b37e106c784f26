//! PostgreSQL backend
//!
//! Connection pooling and the relational implementation of the user store.

pub mod config;
pub mod repository;

pub use repository::PgUserRepository;
