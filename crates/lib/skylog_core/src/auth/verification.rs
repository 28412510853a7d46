//! Email verification codes.
//!
//! Six-digit, single-use codes keyed by normalized email, held in an
//! injected [`CodeStore`] with a TTL. A pending code survives at most
//! [`MAX_CODE_ATTEMPTS`] wrong guesses. Getting the code to the user is the
//! job of a [`CodeDelivery`] implementation.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::{Rng, rng};
use tracing::{debug, info};

use super::AuthError;
use crate::models::auth::normalize_email;

/// Default code lifetime: 30 minutes.
pub const DEFAULT_CODE_TTL_SECS: i64 = 30 * 60;

/// Longest lifetime a code may be configured with: one day.
pub const MAX_CODE_TTL_SECS: i64 = 24 * 60 * 60;

/// Wrong guesses allowed before a pending code is discarded.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// How often the in-memory store evicts expired codes.
const CLEANUP_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Generate a six-digit code.
pub fn generate_code() -> String {
    rng().random_range(100_000..1_000_000).to_string()
}

/// Compare two codes without short-circuiting on the first differing byte.
pub fn codes_match(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Key-value store for pending codes.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `code` for `email`, replacing any pending code.
    async fn put(&self, email: &str, code: &str, ttl: Duration) -> Result<(), AuthError>;

    /// Consume the pending code for `email` if it matches and has not
    /// expired. Returns `true` at most once per stored code. Each mismatch
    /// counts against the code; after [`MAX_CODE_ATTEMPTS`] of them the code
    /// is gone and a new one must be requested.
    async fn consume(&self, email: &str, code: &str) -> Result<bool, AuthError>;

    /// Drop expired entries.
    async fn purge_expired(&self) -> Result<usize, AuthError>;
}

/// Sends a code to its recipient.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone)]
struct PendingCode {
    code: String,
    expires_at: DateTime<Utc>,
    failed_attempts: u32,
}

/// In-memory [`CodeStore`].
#[derive(Debug, Default)]
pub struct InMemoryCodeStore {
    codes: DashMap<String, PendingCode>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored codes, expired or not.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.codes.len();
        self.codes.retain(|_, pending| pending.expires_at > now);
        before.saturating_sub(self.codes.len())
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let evicted = store.evict_expired();
                if evicted > 0 {
                    debug!(evicted, "evicted expired verification codes");
                }
            }
        })
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn put(&self, email: &str, code: &str, ttl: Duration) -> Result<(), AuthError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::ValidationError("code TTL out of range".into()))?;
        self.codes.insert(
            normalize_email(email),
            PendingCode {
                code: code.to_string(),
                expires_at,
                failed_attempts: 0,
            },
        );
        Ok(())
    }

    async fn consume(&self, email: &str, code: &str) -> Result<bool, AuthError> {
        let now = Utc::now();
        let Entry::Occupied(mut entry) = self.codes.entry(normalize_email(email)) else {
            return Ok(false);
        };

        if entry.get().expires_at <= now {
            entry.remove();
            return Ok(false);
        }
        if codes_match(&entry.get().code, code.trim()) {
            entry.remove();
            return Ok(true);
        }

        entry.get_mut().failed_attempts += 1;
        if entry.get().failed_attempts >= MAX_CODE_ATTEMPTS {
            debug!(attempts = MAX_CODE_ATTEMPTS, "verification code discarded");
            entry.remove();
        }
        Ok(false)
    }

    async fn purge_expired(&self) -> Result<usize, AuthError> {
        Ok(self.evict_expired())
    }
}

/// [`CodeDelivery`] that writes the code to the log. Stands in for an email
/// transport in development deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCodeDelivery;

#[async_trait]
impl CodeDelivery for LogCodeDelivery {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), AuthError> {
        info!(email, code, "verification code issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[tokio::test]
    async fn code_is_single_use() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "123456", Duration::minutes(30)).await.unwrap();
        assert!(store.consume("A@X.com", "123456").await.unwrap());
        assert!(!store.consume("a@x.com", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn wrong_code_keeps_pending_code() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "123456", Duration::minutes(30)).await.unwrap();
        assert!(!store.consume("a@x.com", "654321").await.unwrap());
        assert!(store.consume("a@x.com", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn code_is_discarded_after_too_many_wrong_guesses() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "123456", Duration::minutes(30)).await.unwrap();
        for _ in 0..MAX_CODE_ATTEMPTS {
            assert!(!store.consume("a@x.com", "000000").await.unwrap());
        }
        assert!(store.is_empty());
        assert!(!store.consume("a@x.com", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn fresh_code_resets_attempts() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "123456", Duration::minutes(30)).await.unwrap();
        for _ in 0..MAX_CODE_ATTEMPTS - 1 {
            assert!(!store.consume("a@x.com", "000000").await.unwrap());
        }
        store.put("a@x.com", "654321", Duration::minutes(30)).await.unwrap();
        assert!(!store.consume("a@x.com", "000000").await.unwrap());
        assert!(store.consume("a@x.com", "654321").await.unwrap());
    }

    #[test]
    fn code_comparison() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("123456", "12345"));
        assert!(!codes_match("123456", ""));
    }

    #[tokio::test]
    async fn huge_ttl_is_rejected() {
        let store = InMemoryCodeStore::new();
        let err = store
            .put("a@x.com", "123456", Duration::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[tokio::test]
    async fn expired_code_never_matches() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "123456", Duration::seconds(-1)).await.unwrap();
        store.put("b@x.com", "123456", Duration::seconds(-1)).await.unwrap();
        assert!(!store.consume("a@x.com", "123456").await.unwrap());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn newer_code_replaces_older() {
        let store = InMemoryCodeStore::new();
        store.put("a@x.com", "111111", Duration::minutes(30)).await.unwrap();
        store.put("a@x.com", "222222", Duration::minutes(30)).await.unwrap();
        assert!(!store.consume("a@x.com", "111111").await.unwrap());
        assert!(store.consume("a@x.com", "222222").await.unwrap());
    }
}
