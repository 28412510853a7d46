//! JWT token generation and verification.
//!
//! Tokens are HS256-signed. The issuer signs with the primary secret; the
//! verifier accepts the primary secret followed by any previous secrets so
//! a secret can be rotated without invalidating every outstanding token.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};

use super::{AuthError, TokenError};
use crate::models::auth::{Identity, TokenClaims};

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Longest lifetime a token may be issued with: 366 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 366 * 24 * 60 * 60;

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Anything that can turn a bearer token into claims.
pub trait VerifyToken: Send + Sync {
    fn verify_token(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// Signs access tokens with the primary secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer. An empty secret or a default TTL outside
    /// `(0, MAX_TOKEN_TTL_SECS]` is a configuration error.
    pub fn new(secret: &[u8], default_ttl: Duration) -> Result<Self, AuthError> {
        check_secret(secret)?;
        if default_ttl <= Duration::zero() {
            return Err(AuthError::Config("token TTL must be positive".into()));
        }
        if default_ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(AuthError::Config(format!(
                "token TTL must not exceed {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret),
            default_ttl,
        })
    }

    /// TTL applied when `issue` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `identity` valid for `ttl` (or the default TTL).
    pub fn issue(&self, identity: &Identity, ttl: Option<Duration>) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl <= Duration::zero() {
            return Err(AuthError::ValidationError("token TTL must be positive".into()));
        }
        if ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(AuthError::ValidationError(format!(
                "token TTL must not exceed {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        self.issue_at(identity, Utc::now(), ttl)
    }

    /// Issue a token with an explicit issue time and any TTL, including
    /// negative ones. Used to mint already-expired tokens. Fails when the
    /// expiry falls outside the representable time range.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::ValidationError("token expiry out of range".into()))?;
        let claims = TokenClaims {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            avatar: identity.avatar.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign pre-built claims.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
    }
}

/// Verifies tokens against an ordered list of secrets.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Vec<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier. The first secret is tried first; at least one
    /// non-empty secret is required.
    pub fn new<S: AsRef<[u8]>>(secrets: &[S]) -> Result<Self, AuthError> {
        if secrets.is_empty() {
            return Err(AuthError::Config("at least one JWT secret is required".into()));
        }
        let mut keys = Vec::with_capacity(secrets.len());
        for secret in secrets {
            check_secret(secret.as_ref())?;
            keys.push(DecodingKey::from_secret(secret.as_ref()));
        }

        // Expiry is checked by hand so that `exp == now` is already expired
        // and no leeway applies.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Ok(Self { keys, validation })
    }

    /// Number of secrets accepted.
    pub fn secret_count(&self) -> usize {
        self.keys.len()
    }

    /// Verify `token` against the current clock.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify `token` as of unix time `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let claims = self.decode_claims(token)?;
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        for (index, key) in self.keys.iter().enumerate() {
            match decode::<TokenClaims>(token, key, &self.validation) {
                Ok(data) => {
                    if index > 0 {
                        debug!(secret_index = index, "token verified with a previous secret");
                    }
                    return Ok(data.claims);
                }
                Err(e) => match e.kind() {
                    ErrorKind::InvalidSignature => continue,
                    kind => {
                        debug!(error = ?kind, "malformed token");
                        return Err(TokenError::Malformed);
                    }
                },
            }
        }
        Err(TokenError::InvalidSignature)
    }
}

impl VerifyToken for TokenVerifier {
    fn verify_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token)
    }
}

/// Build the issuer/verifier pair from the primary secret and any previous
/// secrets still accepted for verification.
pub fn token_services(
    primary: &str,
    previous: &[String],
    default_ttl: Duration,
) -> Result<(TokenIssuer, TokenVerifier), AuthError> {
    let issuer = TokenIssuer::new(primary.as_bytes(), default_ttl)?;
    let mut secrets: Vec<&[u8]> = vec![primary.as_bytes()];
    secrets.extend(
        previous
            .iter()
            .map(|s| s.as_bytes())
            .filter(|s| !s.is_empty()),
    );
    let verifier = TokenVerifier::new(&secrets)?;
    Ok((issuer, verifier))
}

fn check_secret(secret: &[u8]) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Config("JWT secret must not be empty".into()));
    }
    if secret.len() < RECOMMENDED_SECRET_LEN {
        warn!(
            len = secret.len(),
            recommended = RECOMMENDED_SECRET_LEN,
            "JWT secret is shorter than recommended"
        );
    }
    Ok(())
}
