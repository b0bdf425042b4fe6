//! Domain entities and the transient filter structures.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Role assigned to new users when registration does not name one.
pub const DEFAULT_ROLE_ID: i32 = 1;

/// Named role, referenced by users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// User account with its role joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC hash; the submitted plaintext never reaches the store.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub article: String,
    pub price: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Creation fields ──────────────────────────────────────────────────────────

/// Fields for a new user row. `role_id` falls back to [`DEFAULT_ROLE_ID`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub article: String,
    pub price: f64,
    pub description: String,
}

// ── Partial updates ──────────────────────────────────────────────────────────

/// Partial user update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleChanges {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub article: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

// ── Filters ──────────────────────────────────────────────────────────────────

/// Match criteria for user lookups. An unset field means "no constraint";
/// unknown fields are rejected when deserializing.
///
/// Under the generic repository contract every set field matches exactly.
/// The user listing treats the name fields as case-insensitive substrings
/// instead; see `UserLookup::find_all`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserFilter {
    pub id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

/// Exact-match criteria for role lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleFilter {
    pub id: Option<i32>,
    pub name: Option<String>,
}

/// Exact-match criteria for product lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFilter {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub article: Option<String>,
}
