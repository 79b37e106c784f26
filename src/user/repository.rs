//! User Repository Module
//!
//! This module defines the repository interface for user data persistence.
//! Backends live in `crate::postgres`, `crate::mongo` and `crate::mocks`;
//! each assigns identifiers on insert and enforces e-mail uniqueness at the
//! storage level, reporting a violation as `UserError::EmailExists`.

use super::models::{NewUser, User, UserFilter};
use crate::user::error::UserError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository trait defining operations for user data persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Short backend name used in logs and health output
    fn backend(&self) -> &'static str;

    /// Lists matching users ordered by id, skipping `skip` and returning at most `limit`
    async fn list(&self, filter: &UserFilter, skip: u64, limit: u64)
        -> Result<Vec<User>, UserError>;

    /// Counts users matching the filter
    async fn count(&self, filter: &UserFilter) -> Result<u64, UserError>;

    /// Finds a user by their unique ID
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError>;

    /// Finds a user holding `email`, ignoring the user `exclude` if given
    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<&Uuid>,
    ) -> Result<Option<User>, UserError>;

    /// Stores a new user under a freshly assigned ID
    async fn insert(&self, user: &NewUser) -> Result<User, UserError>;

    /// Replaces every field of an existing user; `None` when the ID is unknown
    async fn replace(&self, id: &Uuid, user: &NewUser) -> Result<Option<User>, UserError>;

    /// Removes a user; `None` when the ID is unknown
    async fn delete(&self, id: &Uuid) -> Result<Option<User>, UserError>;

    /// Round-trips to the store
    async fn ping(&self) -> Result<(), UserError>;
}
