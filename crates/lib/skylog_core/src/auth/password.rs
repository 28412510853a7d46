//! Password hashing via bcrypt.

use super::AuthError;

/// Default bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt at the default cost. The salt is embedded
/// in the returned string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

/// Hash a password with an explicit bcrypt cost (4..=31).
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password_with_cost("secret123", TEST_COST).expect("hash");
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password_with_cost("secret123", TEST_COST).expect("hash");
        let b = hash_password_with_cost("secret123", TEST_COST).expect("hash");
        assert_ne!(a, b);
        assert!(!a.contains("secret123"));
    }

    #[test]
    fn malformed_hash_is_false() {
        assert!(!verify_password("secret123", "not-a-bcrypt-hash"));
        assert!(!verify_password("secret123", ""));
    }

    #[test]
    fn invalid_cost_is_an_error() {
        let err = hash_password_with_cost("secret123", 2).expect_err("cost too low");
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[test]
    fn default_cost_hash_verifies() {
        let hash = hash_password("secret123").expect("hash");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("secret123", &hash));
    }
}
