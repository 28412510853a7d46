//! API server configuration.

use std::fmt;

use chrono::Duration;
use skylog_core::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use skylog_core::auth::password::BCRYPT_COST;
use skylog_core::auth::verification::{DEFAULT_CODE_TTL_SECS, MAX_CODE_TTL_SECS};
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; refusing to start without a signing secret")]
    MissingSecret,

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Secret used to sign new tokens.
    pub jwt_secret: String,
    /// Retired secrets still accepted when verifying, newest first.
    pub jwt_previous_secrets: Vec<String>,
    /// Lifetime of issued tokens.
    pub token_ttl_secs: i64,
    /// Lifetime of email verification codes.
    pub code_ttl_secs: i64,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// A config with defaults for everything but the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_previous_secrets: Vec::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            code_ttl_secs: DEFAULT_CODE_TTL_SECS,
            bcrypt_cost: BCRYPT_COST,
        }
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ConfigError::Invalid {
                var: "SKYLOG_TOKEN_TTL_SECS",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            });
        }
        if !(1..=MAX_CODE_TTL_SECS).contains(&self.code_ttl_secs) {
            return Err(ConfigError::Invalid {
                var: "SKYLOG_CODE_TTL_SECS",
                reason: format!("must be between 1 and {MAX_CODE_TTL_SECS}"),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                var: "SKYLOG_BCRYPT_COST",
                reason: "must be between 4 and 31".into(),
            });
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs)
    }

    pub fn code_ttl(&self) -> Duration {
        Duration::seconds(self.code_ttl_secs)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<redacted>")
            .field("jwt_previous_secrets", &self.jwt_previous_secrets.len())
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("code_ttl_secs", &self.code_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Split a comma-separated secret list, dropping blanks.
pub fn parse_secret_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
