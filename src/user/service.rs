//! User Service Module
//!
//! This module provides the business logic for user management operations.
//! It serves as an intermediary layer between the API handlers and the data repository,
//! implementing validation, pagination and the e-mail uniqueness rule.

use crate::user::{
    dto::{UserListResponse, UserPayload},
    error::UserError,
    models::{NewUser, PageRequest, User, UserFilter},
    repository::UserRepository,
};
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

/// Service for managing user-related operations
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new UserService over the given store
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
        }
    }

    /// The underlying store
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repo
    }

    /// Lists one page of users matching `filter`
    pub async fn list_users(
        &self,
        page: PageRequest,
        filter: &UserFilter,
    ) -> Result<UserListResponse, UserError> {
        debug!(
            "Listing users page={} limit={} search={:?}",
            page.page,
            page.limit,
            filter.search()
        );

        let data =
            self.repo.list(filter, page.skip(), page.limit).await.inspect_err(log_failure)?;
        let total = self.repo.count(filter).await.inspect_err(log_failure)?;

        Ok(UserListResponse {
            page: page.page,
            limit: page.limit,
            total,
            total_pages: page.total_pages(total),
            data,
        })
    }

    /// Gets a user by their ID
    pub async fn get_user(&self, id: &str) -> Result<User, UserError> {
        let Some(id) = parse_id(id) else {
            return Err(UserError::UserNotFound);
        };

        self.repo.find_by_id(&id).await.inspect_err(log_failure)?.ok_or(UserError::UserNotFound)
    }

    /// Registers a new user
    pub async fn create_user(&self, payload: UserPayload) -> Result<User, UserError> {
        let new_user = NewUser::try_from(payload)?;

        let existing =
            self.repo.find_by_email(&new_user.email, None).await.inspect_err(log_failure)?;
        if existing.is_some() {
            return Err(UserError::EmailExists);
        }

        let user = self.repo.insert(&new_user).await.inspect_err(log_failure)?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    /// Replaces every field of an existing user
    pub async fn update_user(&self, id: &str, payload: UserPayload) -> Result<User, UserError> {
        let new_user = NewUser::try_from(payload)?;
        let Some(id) = parse_id(id) else {
            return Err(UserError::UserNotFound);
        };

        if self.repo.find_by_id(&id).await.inspect_err(log_failure)?.is_none() {
            return Err(UserError::UserNotFound);
        }

        if self
            .repo
            .find_by_email(&new_user.email, Some(&id))
            .await
            .inspect_err(log_failure)?
            .is_some()
        {
            return Err(UserError::EmailExists);
        }

        // The record can vanish between the lookup and the write.
        let user = self
            .repo
            .replace(&id, &new_user)
            .await
            .inspect_err(log_failure)?
            .ok_or(UserError::UserNotFound)?;

        info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Permanently removes a user
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        let Some(id) = parse_id(id) else {
            return Err(UserError::UserNotFound);
        };

        match self.repo.delete(&id).await.inspect_err(log_failure)? {
            Some(user) => {
                info!("Deleted user {}", user.id);
                Ok(())
            },
            None => Err(UserError::UserNotFound),
        }
    }
}

/// Identifiers that do not parse cannot name a stored user
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn log_failure(err: &UserError) {
    if let UserError::Database(message) = err {
        error!("User store failure: {}", message);
    }
}
