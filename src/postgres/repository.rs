//! PostgreSQL implementation of the UserRepository

use super::config::health_check;
use crate::user::error::UserError;
use crate::user::models::{NewUser, User, UserFilter};
use crate::user::repository::UserRepository;
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        age BIGINT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        address TEXT
    )
";

const USER_COLUMNS: &str = "id, name, age, email, address";

const SEARCH_CLAUSE: &str =
    r"name ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\' OR address ILIKE $1 ESCAPE '\'";

pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    /// Creates a new PostgreSQL user repository
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
        }
    }

    /// Creates the users table if it is missing
    pub async fn ensure_schema(&self) -> Result<(), UserError> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_USERS_TABLE).await?;
        Ok(())
    }
}

/// Wrap the search text for ILIKE, escaping the pattern metacharacters
fn like_pattern(filter: &UserFilter) -> Option<String> {
    filter.search().map(|search| {
        let mut pattern = String::with_capacity(search.len() + 2);
        pattern.push('%');
        for c in search.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    })
}

/// LIMIT / OFFSET take BIGINT
fn sql_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn user_from_row(row: &Row) -> Result<User, tokio_postgres::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(
        &self,
        filter: &UserFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<User>, UserError> {
        let client = self.pool.get().await?;
        let (limit, offset) = (sql_bigint(limit), sql_bigint(skip));

        let rows = match like_pattern(filter) {
            Some(pattern) => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE {SEARCH_CLAUSE} \
                     ORDER BY id LIMIT $2 OFFSET $3"
                );
                client.query(&sql, &[&pattern, &limit, &offset]).await?
            },
            None => {
                let sql =
                    format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
                client.query(&sql, &[&limit, &offset]).await?
            },
        };

        rows.iter().map(user_from_row).collect::<Result<_, _>>().map_err(Into::into)
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserError> {
        let client = self.pool.get().await?;

        let row = match like_pattern(filter) {
            Some(pattern) => {
                let sql = format!("SELECT COUNT(*) FROM users WHERE {SEARCH_CLAUSE}");
                client.query_one(&sql, &[&pattern]).await?
            },
            None => client.query_one("SELECT COUNT(*) FROM users", &[]).await?,
        };

        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = client.query_opt(&sql, &[id]).await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<&Uuid>,
    ) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2) LIMIT 1"
        );
        let exclude: Option<Uuid> = exclude.copied();
        let row = client.query_opt(&sql, &[&email, &exclude]).await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let id = Uuid::now_v7();
        let row = client
            .query_one(&sql, &[&id, &user.name, &user.age, &user.email, &user.address])
            .await?;

        Ok(user_from_row(&row)?)
    }

    async fn replace(&self, id: &Uuid, user: &NewUser) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE users SET name = $2, age = $3, email = $4, address = $5 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = client
            .query_opt(&sql, &[id, &user.name, &user.age, &user.email, &user.address])
            .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = client.query_opt(&sql, &[id]).await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn ping(&self) -> Result<(), UserError> {
        health_check(&self.pool).await.map_err(UserError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::config::create_pool;

    #[test]
    fn test_like_pattern_wraps_search() {
        let filter = UserFilter::from_search("an");
        assert_eq!(like_pattern(&filter).as_deref(), Some("%an%"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let filter = UserFilter::from_search(r"50%_off\");
        assert_eq!(like_pattern(&filter).as_deref(), Some(r"%50\%\_off\\%"));
    }

    #[test]
    fn test_like_pattern_absent_without_search() {
        assert!(like_pattern(&UserFilter::all()).is_none());
    }

    #[test]
    fn test_sql_bigint_saturates() {
        assert_eq!(sql_bigint(5), 5);
        assert_eq!(sql_bigint(u64::MAX), i64::MAX);
    }

    /// Requires a disposable database in `TEST_POSTGRES_URL`
    #[tokio::test]
    #[ignore]
    async fn test_postgres_round_trip() {
        let url = std::env::var("TEST_POSTGRES_URL").expect("TEST_POSTGRES_URL must be set");
        let repo = PgUserRepository::new(create_pool(&url, 2).unwrap());
        repo.ensure_schema().await.unwrap();

        let email = format!("{}@example.com", Uuid::new_v4());
        let new_user = NewUser {
            name: "Round Trip".to_string(),
            age: 33,
            email: email.clone(),
            address: Some("Da Nang".to_string()),
        };

        let created = repo.insert(&new_user).await.unwrap();
        assert!(matches!(repo.insert(&new_user).await, Err(UserError::EmailExists)));

        let filter = UserFilter::from_search(&email.to_uppercase());
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
        assert_eq!(repo.list(&filter, 0, 5).await.unwrap(), vec![created.clone()]);

        assert!(repo.delete(&created.id).await.unwrap().is_some());
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }
}
