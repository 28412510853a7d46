//! Authentication and authorization logic.
//!
//! Password hashing, JWT issuance and verification, bearer-header
//! authentication, resource owner-checks and email verification codes.
//! Shared by `skylog_api` and `skylog_cli`.

pub mod authenticator;
pub mod jwt;
pub mod ownership;
pub mod password;
pub mod verification;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Reasons a bearer token fails verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature does not match any configured secret")]
    InvalidSignature,

    #[error("token could not be parsed")]
    Malformed,
}

/// Outcome of a failed authentication or authorization check.
///
/// Every variant except `Forbidden` means the caller is unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Missing credentials")]
    MissingCredential,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidSignature,

    #[error("Invalid token")]
    MalformedToken,

    #[error("Not allowed to modify this resource")]
    Forbidden,
}

impl AuthFailure {
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthFailure::Forbidden)
    }
}

impl From<TokenError> for AuthFailure {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthFailure::TokenExpired,
            TokenError::InvalidSignature => AuthFailure::InvalidSignature,
            TokenError::Malformed => AuthFailure::MalformedToken,
        }
    }
}
