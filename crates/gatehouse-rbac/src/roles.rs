//! # Roles
//!
//! A [`Role`] is a named capability bound to exactly one [`Resource`]. Roles
//! are labels constructed at call sites; what a role allows is decided by
//! business logic, so role names are never centrally enumerated and adding a
//! new role needs no migration of persisted data.
//!
//! Hierarchies are expressed by the caller. If an `"editor"` role on an
//! account implies `"editor"` on each of its documents, the check for a
//! document is made against [`roles_for`] over both resources; this crate
//! never assumes such a relationship itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resources::{Resource, ResourceId};

/// Name of the role granted on the platform resource to owners.
pub const OWNER_ROLE: &str = "owner";

/// Free-form role name, e.g. `"editor"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Create a role name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string representation of the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RoleName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoleName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named capability on one resource.
///
/// # Example
///
/// ```
/// use gatehouse_rbac::{Resource, Role};
///
/// let role = Role::new("editor", Resource::new("doc", "42"));
/// assert_eq!(role.name().as_str(), "editor");
/// assert_eq!(role.to_string(), "editor@doc:42");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    name: RoleName,
    resource: Resource,
}

impl Role {
    /// Create a role.
    pub fn new(name: impl Into<RoleName>, resource: Resource) -> Self {
        Self {
            name: name.into(),
            resource,
        }
    }

    /// The owner role: full access over the platform resource.
    pub fn owner() -> Self {
        Self::new(OWNER_ROLE, Resource::platform())
    }

    /// Name of the role.
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Resource the role applies to.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.resource)
    }
}

/// Ordered collection of roles, read as "any of these".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Roles(Vec<Role>);

impl Roles {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Fan one role name out over many resources.
    ///
    /// The resulting roles keep the order of `resources`.
    pub fn for_resources(
        name: impl Into<RoleName>,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Self {
        let name = name.into();
        resources
            .into_iter()
            .map(|resource| Role::new(name.clone(), resource))
            .collect()
    }

    /// Append a role.
    pub fn push(&mut self, role: Role) {
        self.0.push(role);
    }

    /// Identifiers of every referenced resource.
    ///
    /// Order is preserved and duplicates are kept, which makes the result
    /// usable directly as an `IN (...)` list when loading the entities a user
    /// can reach.
    pub fn identifiers(&self) -> Vec<&ResourceId> {
        self.0.iter().map(|role| role.resource().identifier()).collect()
    }

    /// Iterate over the roles.
    pub fn iter(&self) -> std::slice::Iter<'_, Role> {
        self.0.iter()
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection holds no roles.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the roles as a slice.
    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl From<Vec<Role>> for Roles {
    fn from(roles: Vec<Role>) -> Self {
        Self(roles)
    }
}

impl From<Role> for Roles {
    fn from(role: Role) -> Self {
        Self(vec![role])
    }
}

impl FromIterator<Role> for Roles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Role> for Roles {
    fn extend<I: IntoIterator<Item = Role>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Roles {
    type Item = Role;
    type IntoIter = std::vec::IntoIter<Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Roles {
    type Item = &'a Role;
    type IntoIter = std::slice::Iter<'a, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Fan a single role name across several resources.
///
/// # Example
///
/// ```
/// use gatehouse_rbac::{roles_for, Resource};
///
/// let roles = roles_for("viewer", [Resource::new("doc", "1"), Resource::new("doc", "2")]);
/// assert_eq!(roles.len(), 2);
/// assert!(roles.iter().all(|r| r.name().as_str() == "viewer"));
/// ```
pub fn roles_for(name: impl Into<RoleName>, resources: impl IntoIterator<Item = Resource>) -> Roles {
    Roles::for_resources(name, resources)
}

/// The users holding one role on one resource.
///
/// Groups are the persisted side of the model: a store keeps one row per
/// `(kind, identifier, role name, user id)` and a group is what listing those
/// rows for a single role gives back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// The role shared by every member.
    pub role: Role,

    /// Member user ids, without duplicates.
    pub users: Vec<String>,
}

impl Group {
    /// Create an empty group for a role.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            users: Vec::new(),
        }
    }

    /// Add a member. Adding an existing member does nothing.
    pub fn add_user(&mut self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        if !self.users.contains(&user_id) {
            self.users.push(user_id);
        }
    }

    /// Check if a user is a member.
    pub fn contains(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
