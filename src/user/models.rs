//! User domain models
//!
//! Core user records plus the filter and page window used by listings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page when the query omits or garbles it
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size when the query omits or garbles it
pub const DEFAULT_LIMIT: u64 = 5;

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Validated field set for inserts and full replacements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub address: Option<String>,
}

impl NewUser {
    /// Attach an identifier, producing the stored shape
    pub fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
            address: self.address,
        }
    }
}

/// Listing filter: case-insensitive substring search over name, email and address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    search: Option<String>,
}

impl UserFilter {
    /// Filter matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw search text; empty text matches everything
    pub fn from_search(search: &str) -> Self {
        if search.is_empty() {
            Self::all()
        } else {
            Self {
                search: Some(search.to_string()),
            }
        }
    }

    /// The literal search text, if any
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Evaluate the filter against a record in process
    pub fn matches(&self, user: &User) -> bool {
        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);

        contains(&user.name)
            || contains(&user.email)
            || user.address.as_deref().is_some_and(contains)
    }
}

/// Offset window derived from 1-based page and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Create a page window, falling back to defaults for zero values
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Number of records to skip
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed to hold `total` records
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::now_v7(),
            name: "Nguyen An".to_string(),
            age: 20,
            email: "an@example.com".to_string(),
            address: Some("Ha Noi".to_string()),
        }
    }

    #[test]
    fn test_empty_search_matches_all() {
        let filter = UserFilter::from_search("");
        assert_eq!(filter, UserFilter::all());
        assert!(filter.matches(&sample_user()));
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let user = sample_user();
        assert!(UserFilter::from_search("NGUYEN").matches(&user));
        assert!(UserFilter::from_search("Example.COM").matches(&user));
        assert!(UserFilter::from_search("ha noi").matches(&user));
        assert!(!UserFilter::from_search("saigon").matches(&user));
    }

    #[test]
    fn test_search_ignores_missing_address() {
        let mut user = sample_user();
        user.address = None;
        assert!(!UserFilter::from_search("noi").matches(&user));
    }

    #[test]
    fn test_search_is_literal() {
        let user = sample_user();
        assert!(!UserFilter::from_search(".*").matches(&user));
        assert!(UserFilter::from_search("an@example.").matches(&user));
    }

    #[test]
    fn test_page_skip() {
        assert_eq!(PageRequest::new(1, 5).skip(), 0);
        assert_eq!(PageRequest::new(3, 5).skip(), 10);
        assert_eq!(PageRequest::new(u64::MAX, u64::MAX).skip(), u64::MAX);
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        assert_eq!(PageRequest::new(0, 0), PageRequest::default());
    }

    #[test]
    fn test_total_pages() {
        let page = PageRequest::new(1, 5);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(5), 1);
        assert_eq!(page.total_pages(12), 3);
        assert_eq!(PageRequest::new(1, 1).total_pages(7), 7);
    }
}
