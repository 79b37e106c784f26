//! MongoDB document-store backend
//!
//! Provides connection management and the MongoDB user repository.

mod connector;
mod repository;

pub use connector::{connect, MongoError};
pub use repository::MongoUserRepository;
