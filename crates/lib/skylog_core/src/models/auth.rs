//! Identity and token-claim models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uuid::uuidv7;

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Lower-case and trim an email address. Emails compare case-insensitively,
/// so every store lookup and insert goes through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A registered principal, including the password hash.
///
/// Never serialized directly: API responses map it to a public shape.
#[derive(Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Build a fresh, unverified `user` identity. `password_hash` must come
    /// from [`crate::auth::password::hash_password`].
    pub fn new(email: &str, name: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuidv7(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            password_hash,
            role: Role::User,
            avatar: None,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("avatar", &self.avatar)
            .field("is_verified", &self.is_verified)
            .finish()
    }
}

/// JWT claims embedded in bearer tokens. Shared by issuer and verifier.
///
/// The identity fields are a snapshot taken at issuance; they are not
/// re-read from the store when the token is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: identity id (standard JWT `sub` claim).
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
