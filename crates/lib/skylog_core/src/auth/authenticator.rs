//! Bearer-header authentication.
//!
//! The single place where an `Authorization` header value becomes either
//! verified claims or an [`AuthFailure`]. Claims embedded in the token are
//! trusted as-is; no store lookup happens here.

use tracing::debug;

use super::AuthFailure;
use super::jwt::{TokenVerifier, VerifyToken};
use crate::models::auth::TokenClaims;

/// Extract the token from `Bearer <token>`.
///
/// The scheme is matched case-insensitively. Missing headers, other schemes,
/// empty tokens and tokens containing whitespace all yield `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Turns raw `Authorization` header values into claims.
pub struct Authenticator<V = TokenVerifier> {
    verifier: V,
}

impl<V: VerifyToken> Authenticator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// Authenticate a raw header value.
    ///
    /// A header that is not a well-formed bearer credential is rejected with
    /// [`AuthFailure::MissingCredential`] before the verifier is consulted.
    pub fn authenticate(&self, header: Option<&str>) -> Result<TokenClaims, AuthFailure> {
        let token = bearer_token(header).ok_or(AuthFailure::MissingCredential)?;
        self.verifier.verify_token(token).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            AuthFailure::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, Utc};

    use super::*;
    use crate::auth::TokenError;
    use crate::auth::jwt::TokenIssuer;
    use crate::models::auth::Identity;

    const SECRET: &str = "authenticator-test-secret-0123456789abcd";

    /// Records how often it is called and always fails.
    #[derive(Default)]
    struct CountingVerifier {
        calls: AtomicUsize,
    }

    impl VerifyToken for CountingVerifier {
        fn verify_token(&self, _token: &str) -> Result<TokenClaims, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TokenError::Malformed)
        }
    }

    fn real() -> (TokenIssuer, Authenticator) {
        let issuer = TokenIssuer::new(SECRET.as_bytes(), Duration::days(7)).unwrap();
        let verifier = TokenVerifier::new(&[SECRET]).unwrap();
        (issuer, Authenticator::new(verifier))
    }

    #[test]
    fn bearer_token_shapes() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(Some("Basic xyz")), None);
        assert_eq!(bearer_token(Some("Bearer a b")), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn valid_token_yields_claims() {
        let (issuer, auth) = real();
        let identity = Identity::new("a@x.com", "Alice", "hash".into());
        let token = issuer.issue(&identity, None).unwrap();
        let claims = auth
            .authenticate(Some(&format!("Bearer {token}")))
            .expect("claims");
        assert_eq!(claims.sub, identity.id);
    }

    #[test]
    fn malformed_headers_skip_the_verifier() {
        let auth = Authenticator::new(CountingVerifier::default());
        for header in [None, Some(""), Some("Basic xyz"), Some("Bearer  ")] {
            assert_eq!(auth.authenticate(header), Err(AuthFailure::MissingCredential));
        }
        assert_eq!(auth.verifier.calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            auth.authenticate(Some("Bearer token")),
            Err(AuthFailure::MalformedToken)
        );
        assert_eq!(auth.verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_token_is_reported() {
        let (issuer, auth) = real();
        let identity = Identity::new("a@x.com", "Alice", "hash".into());
        let token = issuer
            .issue_at(&identity, Utc::now(), Duration::seconds(-1))
            .unwrap();
        assert_eq!(
            auth.authenticate(Some(&format!("Bearer {token}"))),
            Err(AuthFailure::TokenExpired)
        );
    }

    #[test]
    fn foreign_signature_is_reported() {
        let (_, auth) = real();
        let other = TokenIssuer::new(b"some-other-secret-0123456789abcdefgh", Duration::days(1))
            .unwrap();
        let identity = Identity::new("a@x.com", "Alice", "hash".into());
        let token = other.issue(&identity, None).unwrap();
        assert_eq!(
            auth.authenticate(Some(&format!("Bearer {token}"))),
            Err(AuthFailure::InvalidSignature)
        );
    }
}
