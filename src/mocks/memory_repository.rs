//! In-memory user store
//!
//! Backs the test suite and `memory://` deployments. Records are kept in a
//! `BTreeMap` keyed by time-ordered UUIDs, so iteration order is insertion order.

use crate::user::error::UserError;
use crate::user::models::{NewUser, User, UserFilter};
use crate::user::repository::UserRepository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing validation
    pub async fn add_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    fn email_taken(users: &BTreeMap<Uuid, User>, email: &str, exclude: Option<&Uuid>) -> bool {
        users.values().any(|user| user.email == email && Some(&user.id) != exclude)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(
        &self,
        filter: &UserFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<User>, UserError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| filter.matches(user))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserError> {
        let users = self.users.read().await;
        let count = users.values().filter(|user| filter.matches(user)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<&Uuid>,
    ) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email == email && Some(&user.id) != exclude)
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, None) {
            return Err(UserError::EmailExists);
        }

        let created = user.clone().into_user(Uuid::now_v7());
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn replace(&self, id: &Uuid, user: &NewUser) -> Result<Option<User>, UserError> {
        let mut users = self.users.write().await;
        if !users.contains_key(id) {
            return Ok(None);
        }
        if Self::email_taken(&users, &user.email, Some(id)) {
            return Err(UserError::EmailExists);
        }

        let updated = user.clone().into_user(*id);
        users.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        Ok(self.users.write().await.remove(id))
    }

    async fn ping(&self) -> Result<(), UserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            age: 30,
            email: email.to_string(),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryUserRepository::new();
        let first = repo.insert(&new_user("An", "an@x.com")).await.unwrap();
        let second = repo.insert(&new_user("Bi", "bi@x.com")).await.unwrap();

        assert!(first.id < second.id);
        let listed = repo.list(&UserFilter::all(), 0, 10).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&new_user("An", "an@x.com")).await.unwrap();

        let result = repo.insert(&new_user("Bi", "an@x.com")).await;
        assert!(matches!(result, Err(UserError::EmailExists)));
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&new_user("An", "an@x.com")).await.unwrap();

        assert!(repo.find_by_email("AN@x.com", None).await.unwrap().is_none());
        assert!(repo.insert(&new_user("Bi", "AN@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_email_excludes_id() {
        let repo = InMemoryUserRepository::new();
        let an = repo.insert(&new_user("An", "an@x.com")).await.unwrap();

        assert!(repo.find_by_email("an@x.com", Some(&an.id)).await.unwrap().is_none());
        assert_eq!(repo.find_by_email("an@x.com", None).await.unwrap(), Some(an));
    }

    #[tokio::test]
    async fn test_seeded_user_is_visible_and_reserves_email() {
        let repo = InMemoryUserRepository::new();
        let seeded = new_user("A", "seed@x.com").into_user(Uuid::now_v7());
        repo.add_user(seeded.clone()).await;

        assert_eq!(repo.find_by_id(&seeded.id).await.unwrap(), Some(seeded.clone()));
        assert_eq!(repo.list(&UserFilter::all(), 0, 5).await.unwrap(), vec![seeded]);
        let result = repo.insert(&new_user("Bi", "seed@x.com")).await;
        assert!(matches!(result, Err(UserError::EmailExists)));
    }

    #[tokio::test]
    async fn test_replace_unknown_id_returns_none() {
        let repo = InMemoryUserRepository::new();
        let result = repo.replace(&Uuid::new_v4(), &new_user("An", "an@x.com")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_skip_and_limit_window() {
        let repo = InMemoryUserRepository::new();
        for i in 0..7 {
            repo.insert(&new_user("User", &format!("u{i}@x.com"))).await.unwrap();
        }

        let page = repo.list(&UserFilter::all(), 5, 5).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].email, "u5@x.com");
        assert_eq!(repo.count(&UserFilter::all()).await.unwrap(), 7);
        assert!(repo.list(&UserFilter::all(), u64::MAX, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = InMemoryUserRepository::new();
        let an = repo.insert(&new_user("An", "an@x.com")).await.unwrap();

        assert_eq!(repo.delete(&an.id).await.unwrap(), Some(an.clone()));
        assert!(repo.delete(&an.id).await.unwrap().is_none());
        assert_eq!(repo.count(&UserFilter::all()).await.unwrap(), 0);
    }
}
