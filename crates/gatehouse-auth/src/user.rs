//! User identities
//!
//! Applications expose their account records to sessions through the
//! [`User`] trait. Two implementations ship with the crate: [`LocalUser`] for
//! records whose secret is compared locally, and [`FederatedUser`] for
//! identities vouched for by an [`RbacDelegate`](crate::RbacDelegate).

use std::fmt;
use std::sync::Arc;

use crate::error::{AuthError, AuthResult};

/// An identity that can be authenticated.
pub trait User: Send + Sync + fmt::Debug {
    /// Stable user id.
    fn id(&self) -> &str;

    /// Stored secret to compare presented credentials against.
    ///
    /// Identities whose secret lives with an external authority return
    /// [`AuthError::SecretUnavailable`] instead of a placeholder.
    fn secret(&self) -> AuthResult<&str>;

    /// Whether the account has been verified (email, phone, ...).
    fn is_verified(&self) -> bool;
}

/// Shared handle to an authenticated identity.
pub type Identity = Arc<dyn User>;

/// A user record held by the application's own repository.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalUser {
    id: String,
    secret: String,
    verified: bool,
}

impl LocalUser {
    /// Create a local user.
    ///
    /// `secret` is whatever the repository stores and callers present, a
    /// plain token or a [`hash_secret`](crate::hash::hash_secret) digest.
    pub fn new(id: impl Into<String>, secret: impl Into<String>, verified: bool) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            verified,
        }
    }
}

impl fmt::Debug for LocalUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalUser")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .field("verified", &self.verified)
            .finish()
    }
}

impl User for LocalUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn secret(&self) -> AuthResult<&str> {
        Ok(&self.secret)
    }

    fn is_verified(&self) -> bool {
        self.verified
    }
}

/// An identity verified by an external authority.
///
/// Federated identities are considered verified by default: the delegate
/// accepting the credential is the verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedUser {
    id: String,
    verified: bool,
}

impl FederatedUser {
    /// Create a verified federated identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            verified: true,
        }
    }

    /// Override the verified flag reported by the authority.
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }
}

impl User for FederatedUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn secret(&self) -> AuthResult<&str> {
        Err(AuthError::SecretUnavailable)
    }

    fn is_verified(&self) -> bool {
        self.verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_user() {
        let user = LocalUser::new("u1", "s1", true);
        assert_eq!(user.id(), "u1");
        assert_eq!(user.secret().unwrap(), "s1");
        assert!(user.is_verified());
    }

    #[test]
    fn test_local_user_debug_redacts_secret() {
        let debug = format!("{:?}", LocalUser::new("u1", "hunter2", false));
        assert!(debug.contains("u1"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_federated_user_secret_fails() {
        let user = FederatedUser::new("alice");
        assert_eq!(user.id(), "alice");
        assert!(user.is_verified());
        assert!(matches!(user.secret(), Err(AuthError::SecretUnavailable)));

        let unverified = FederatedUser::new("bob").with_verified(false);
        assert!(!unverified.is_verified());
    }
}
