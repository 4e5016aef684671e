//! Group stores
//!
//! A [`GroupStore`] persists `(kind, identifier, role name, user id)`
//! membership rows and answers membership questions about them. The schema
//! and backend belong to the application; SQL backends can use the
//! statements in [`gatehouse_rbac::table`].
//!
//! Every store must short-circuit checks for the configured master identity
//! (see [`is_master`](crate::master::is_master)) and answer an empty role set
//! with `false` without touching storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_rbac::{Group, Resource, ResourceId, ResourceKind, Role, RoleName, Roles};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::master::{is_master, MasterIdentity};
use crate::scope::Scope;
use crate::user::User;

/// Persistence for group memberships.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Grant `role` to `user`. Granting an existing membership is a no-op.
    ///
    /// Must be an atomic insert-or-update on the membership key so that
    /// concurrent grants converge on one row.
    async fn add(&self, user: &dyn User, role: &Role) -> AuthResult<()>;

    /// Revoke `role` from `user`. Revoking an absent membership is not an
    /// error.
    async fn delete(&self, user: &dyn User, role: &Role) -> AuthResult<()>;

    /// Remove every membership on `resource`. Call when the resource is
    /// destroyed so no rows are orphaned.
    async fn free(&self, resource: &Resource) -> AuthResult<()>;

    /// List the users holding `role`.
    async fn find(&self, role: &Role) -> AuthResult<Group>;

    /// Check whether `user` holds any of `roles`.
    ///
    /// The master identity always passes. An empty role set never does.
    async fn is_user_in_any(&self, user: &dyn User, roles: &Roles) -> AuthResult<bool>;

    /// List every role `user` holds on resources of `kind`.
    async fn resources_accessible_by(
        &self,
        kind: &ResourceKind,
        user: &dyn User,
    ) -> AuthResult<Roles>;
}

/// Require the identity bound in `scope` to hold one of `roles`.
///
/// # Errors
///
/// - [`AuthError::MissingIdentity`] if the scope is not authenticated
/// - [`AuthError::Unauthorized`] if the identity holds none of the roles
/// - [`AuthError::Cancelled`] if the scope is canceled during the check
pub async fn require_any<S>(store: &S, scope: &Scope, roles: &Roles) -> AuthResult<()>
where
    S: GroupStore + ?Sized,
{
    let user = scope.identity()?;

    if scope.run(store.is_user_in_any(user.as_ref(), roles)).await?? {
        Ok(())
    } else {
        tracing::debug!(scope = %scope.id(), user_id = %user.id(), "Authorization denied");
        Err(AuthError::Unauthorized)
    }
}

/// Counters describing how a store has been used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStoreStats {
    /// Queries answered from storage
    pub reads: u64,
    /// Mutations that changed storage
    pub writes: u64,
    /// Membership rows currently stored
    pub memberships: usize,
}

/// Audit timestamps of one membership row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipRecord {
    /// When the membership was first granted
    pub created_at: DateTime<Utc>,
    /// When the membership was last granted
    pub updated_at: DateTime<Utc>,
}

type MembershipKey = (ResourceKind, ResourceId, RoleName, String);

fn membership_key(role: &Role, user_id: &str) -> MembershipKey {
    (
        role.resource().kind().clone(),
        role.resource().identifier().clone(),
        role.name().clone(),
        user_id.to_string(),
    )
}

/// In-memory group store.
///
/// Suitable for tests and single-process deployments. All mutations take a
/// single write lock, so `add`, `delete` and `free` on the same key are
/// serialized and never leave a partial row.
pub struct MemoryGroupStore {
    rows: RwLock<BTreeMap<MembershipKey, MembershipRecord>>,
    master: Option<MasterIdentity>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl std::fmt::Debug for MemoryGroupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGroupStore")
            .field("master", &self.master)
            .field("reads", &self.reads.load(Ordering::Relaxed))
            .field("writes", &self.writes.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryGroupStore {
    /// Create an empty store with no master identity.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            master: None,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Create an empty store that lets the configured master identity
    /// bypass every check.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            master: config.master.clone(),
            ..Self::new()
        }
    }

    /// Audit timestamps of a membership, if it exists.
    pub async fn membership(&self, user_id: &str, role: &Role) -> Option<MembershipRecord> {
        self.rows.read().await.get(&membership_key(role, user_id)).copied()
    }

    /// Get store statistics.
    pub async fn stats(&self) -> GroupStoreStats {
        GroupStoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            memberships: self.rows.read().await.len(),
        }
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MemoryGroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn add(&self, user: &dyn User, role: &Role) -> AuthResult<()> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;

        rows.entry(membership_key(role, user.id()))
            .and_modify(|row| row.updated_at = now)
            .or_insert(MembershipRecord {
                created_at: now,
                updated_at: now,
            });
        self.record_write();

        tracing::debug!(role = %role, user_id = %user.id(), "Membership granted");
        Ok(())
    }

    async fn delete(&self, user: &dyn User, role: &Role) -> AuthResult<()> {
        let removed = self
            .rows
            .write()
            .await
            .remove(&membership_key(role, user.id()))
            .is_some();
        if removed {
            self.record_write();
        }

        tracing::debug!(role = %role, user_id = %user.id(), removed, "Membership revoked");
        Ok(())
    }

    async fn free(&self, resource: &Resource) -> AuthResult<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|(kind, id, _, _), _| {
            kind != resource.kind() || id != resource.identifier()
        });
        let removed = before - rows.len();
        if removed > 0 {
            self.record_write();
        }

        tracing::debug!(resource = %resource, removed, "Resource memberships freed");
        Ok(())
    }

    async fn find(&self, role: &Role) -> AuthResult<Group> {
        let rows = self.rows.read().await;
        self.record_read();

        // Keys sort by (kind, id, role, user), so the group is one contiguous run.
        let mut group = Group::new(role.clone());
        for ((kind, id, name, user_id), _) in rows.range(membership_key(role, "")..) {
            if kind != role.resource().kind()
                || id != role.resource().identifier()
                || name != role.name()
            {
                break;
            }
            group.add_user(user_id.clone());
        }

        Ok(group)
    }

    async fn is_user_in_any(&self, user: &dyn User, roles: &Roles) -> AuthResult<bool> {
        if is_master(self.master.as_ref(), user) {
            return Ok(true);
        }

        if roles.is_empty() {
            return Ok(false);
        }

        let rows = self.rows.read().await;
        self.record_read();

        Ok(roles
            .iter()
            .any(|role| rows.contains_key(&membership_key(role, user.id()))))
    }

    async fn resources_accessible_by(
        &self,
        kind: &ResourceKind,
        user: &dyn User,
    ) -> AuthResult<Roles> {
        let rows = self.rows.read().await;
        self.record_read();

        Ok(rows
            .keys()
            .filter(|(k, _, _, user_id)| k == kind && user_id == user.id())
            .map(|(k, id, name, _)| Role::new(name.clone(), Resource::new(k.clone(), id.clone())))
            .collect())
    }
}
