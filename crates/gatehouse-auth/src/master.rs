//! Master identity
//!
//! A configured superuser that bypasses group lookups. Comparisons are
//! constant-time over both the id and the secret.

use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::user::User;

/// Credential pair of the configured superuser.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterIdentity {
    /// Superuser id
    pub id: String,

    /// Superuser secret
    pub secret: String,
}

impl fmt::Debug for MasterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterIdentity")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl MasterIdentity {
    /// Create a master identity.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// Check an `(id, secret)` pair against the master identity.
    ///
    /// Both halves are always compared so timing does not reveal which one
    /// differed.
    pub fn matches(&self, id: &str, secret: &str) -> bool {
        let id_eq = self.id.as_bytes().ct_eq(id.as_bytes());
        let secret_eq = self.secret.as_bytes().ct_eq(secret.as_bytes());
        (id_eq & secret_eq).into()
    }

    /// Check whether a user is the master identity.
    ///
    /// Identities without a readable secret never match.
    pub fn is_master(&self, user: &dyn User) -> bool {
        match user.secret() {
            Ok(secret) => self.matches(user.id(), secret),
            Err(_) => false,
        }
    }
}

/// Check a user against an optional master identity.
pub fn is_master(master: Option<&MasterIdentity>, user: &dyn User) -> bool {
    master.is_some_and(|m| m.is_master(user))
}
