//! User Data Transfer Objects
//!
//! Request bodies, listing query parameters and response envelopes.

use crate::user::error::UserError;
use crate::user::models::{NewUser, PageRequest, User, UserFilter, DEFAULT_LIMIT, DEFAULT_PAGE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const USER_CREATED_MESSAGE: &str = "Tạo người dùng thành công";
pub const USER_UPDATED_MESSAGE: &str = "Cập nhật người dùng thành công";
pub const USER_DELETED_MESSAGE: &str = "Xóa người dùng thành công";

const NAME_MIN_LENGTH: usize = 2;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// Names are measured in UTF-16 code units, so one astral character counts as two
fn validate_name_length(name: &str) -> Result<(), ValidationError> {
    if name.encode_utf16().count() < NAME_MIN_LENGTH {
        let mut error = ValidationError::new("length");
        error.message = Some("Tên phải có ít nhất 2 ký tự".into());
        return Err(error);
    }
    Ok(())
}

/// Create / replace user request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(
        required(message = "Tên không được để trống"),
        custom(function = "validate_name_length")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Tuổi không được để trống"),
        range(min = 0, message = "Tuổi phải >= 0")
    )]
    pub age: Option<i64>,

    #[validate(
        required(message = "Email không được để trống"),
        regex(path = *EMAIL_REGEX, message = "Email không hợp lệ")
    )]
    pub email: Option<String>,

    pub address: Option<String>,
}

impl UserPayload {
    /// Empty required text counts as missing
    fn normalized(mut self) -> Self {
        self.name = self.name.filter(|name| !name.is_empty());
        self.email = self.email.filter(|email| !email.is_empty());
        self
    }
}

impl TryFrom<UserPayload> for NewUser {
    type Error = UserError;

    fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
        let payload = payload.normalized();
        payload.validate()?;

        match payload {
            UserPayload {
                name: Some(name),
                age: Some(age),
                email: Some(email),
                address,
            } => Ok(NewUser {
                name,
                age,
                email,
                address,
            }),
            _ => Err(UserError::Validation("User validation failed".to_string())),
        }
    }
}

/// List users query parameters
///
/// Values stay raw strings so that garbage falls back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListUsersQuery {
    /// Build from raw query pairs; the first occurrence of a repeated key wins
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                "search" => &mut query.search,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn page_request(&self) -> PageRequest {
        let page = self.page.as_deref().and_then(parse_positive).unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.as_deref().and_then(parse_positive).unwrap_or(DEFAULT_LIMIT);
        PageRequest::new(page, limit)
    }

    pub fn filter(&self) -> UserFilter {
        UserFilter::from_search(self.search.as_deref().unwrap_or_default())
    }
}

/// Read the leading integer of `raw`, accepting only values above zero
///
/// Leading whitespace and an optional sign are skipped, trailing garbage is
/// ignored (`"2abc"` is 2).
pub fn parse_positive(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits_end = unsigned.find(|c: char| !c.is_ascii_digit()).unwrap_or(unsigned.len());
    let digits = unsigned.get(..digits_end)?;
    if digits.is_empty() || negative {
        return None;
    }

    // Overlong inputs saturate rather than fall back.
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    (value > 0).then_some(value)
}

/// User list response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    pub data: Vec<User>,
}

/// Single user response, optionally carrying a confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: User,
}

/// Confirmation without payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
