//! Credential sources
//!
//! A session consults two collaborators: the application's own
//! [`CredentialRepository`], and optionally an [`RbacDelegate`] that checks
//! credentials with a federated identity provider. Both are plain async
//! traits; cancellation is applied by the session racing their futures
//! against its scope, so implementations only need to be drop-safe.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::user::Identity;

/// Looks up user records by id.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Find the user with the given id.
    ///
    /// Returns `Ok(None)` when no such user exists. Errors are reported to
    /// callers of `authenticate` as invalid credentials, so the error
    /// message may carry backend detail without leaking it outward.
    async fn find_auth_user(&self, id: &str) -> AuthResult<Option<Identity>>;
}

/// Verifies credentials with an external identity authority.
///
/// `credential` may be a password or an opaque bearer token depending on the
/// delegate; the contract is the same either way.
#[async_trait]
pub trait RbacDelegate: Send + Sync {
    /// Verify `credential` for `id`.
    ///
    /// Returns the identity the authority vouches for, or `Ok(None)` when it
    /// rejects the credential.
    async fn verify(&self, id: &str, credential: &str) -> AuthResult<Option<Identity>>;
}
