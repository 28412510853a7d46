//! Resource owner-checks.
//!
//! Mutating an owned resource requires the requester's subject id to equal
//! the resource's `owner_id`. Composite rules OR together checks against
//! several references (a comment may be removed by its author or by the
//! owner of the journal it sits on).

use tracing::debug;
use uuid::Uuid;

use super::AuthFailure;
use crate::models::auth::TokenClaims;

/// A resource with a single owning identity.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// True when `claims` identifies the owner of `resource`.
pub fn authorize_mutation<R: Owned + ?Sized>(claims: &TokenClaims, resource: &R) -> bool {
    claims.sub == resource.owner_id()
}

/// True when `claims` identifies the owner of any of `resources`.
pub fn authorize_any(claims: &TokenClaims, resources: &[&dyn Owned]) -> bool {
    resources.iter().any(|r| authorize_mutation(claims, *r))
}

/// [`authorize_mutation`] as a `Result`, failing with `Forbidden`.
pub fn require_owner<R: Owned + ?Sized>(
    claims: &TokenClaims,
    resource: &R,
) -> Result<(), AuthFailure> {
    if authorize_mutation(claims, resource) {
        Ok(())
    } else {
        debug!(subject = %claims.sub, owner = %resource.owner_id(), "owner-check denied");
        Err(AuthFailure::Forbidden)
    }
}

/// [`authorize_any`] as a `Result`, failing with `Forbidden`.
pub fn require_any_owner(
    claims: &TokenClaims,
    resources: &[&dyn Owned],
) -> Result<(), AuthFailure> {
    if authorize_any(claims, resources) {
        Ok(())
    } else {
        debug!(subject = %claims.sub, "composite owner-check denied");
        Err(AuthFailure::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::uuid::uuidv7;

    struct Thing(Uuid);

    impl Owned for Thing {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    fn claims_for(id: Uuid) -> TokenClaims {
        TokenClaims {
            sub: id,
            email: "a@x.com".into(),
            name: "A".into(),
            role: Role::User,
            avatar: None,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn owner_may_mutate() {
        let a = uuidv7();
        assert!(authorize_mutation(&claims_for(a), &Thing(a)));
        assert_eq!(require_owner(&claims_for(a), &Thing(a)), Ok(()));
    }

    #[test]
    fn non_owner_is_forbidden() {
        let (a, b) = (uuidv7(), uuidv7());
        assert!(!authorize_mutation(&claims_for(a), &Thing(b)));
        assert_eq!(
            require_owner(&claims_for(a), &Thing(b)),
            Err(AuthFailure::Forbidden)
        );
    }

    #[test]
    fn admin_role_grants_nothing_extra() {
        let (a, b) = (uuidv7(), uuidv7());
        let mut claims = claims_for(a);
        claims.role = Role::Admin;
        assert!(!authorize_mutation(&claims, &Thing(b)));
    }

    #[test]
    fn composite_check_is_an_or() {
        let (journal_owner, comment_owner, stranger) = (uuidv7(), uuidv7(), uuidv7());
        let journal = Thing(journal_owner);
        let comment = Thing(comment_owner);
        let refs: [&dyn Owned; 2] = [&comment, &journal];
        assert!(authorize_any(&claims_for(journal_owner), &refs));
        assert!(authorize_any(&claims_for(comment_owner), &refs));
        assert!(!authorize_any(&claims_for(stranger), &refs));
        assert_eq!(
            require_any_owner(&claims_for(stranger), &refs),
            Err(AuthFailure::Forbidden)
        );
    }
}
