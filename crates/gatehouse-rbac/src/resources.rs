//! # Resources
//!
//! A resource is any protected entity, addressed by its kind and identifier.
//! Kinds are free-form tags chosen by the application (`"document"`,
//! `"account"`, ...). The reserved [`Resource::platform`] resource sits above
//! every other resource and is what the owner role is granted on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of the reserved platform resource.
pub const PLATFORM_KIND: &str = "platform";

/// Identifier of the reserved platform resource.
pub const PLATFORM_ID: &str = "*";

/// The kind of a resource, e.g. `"document"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ResourceKind(String);

impl ResourceKind {
    /// Create a resource kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the kind is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identifier of a resource within its kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a resource identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_conversions {
    ($ty:ident) => {
        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype_conversions!(ResourceKind);
string_newtype_conversions!(ResourceId);

/// A protected entity, identified by `(kind, identifier)`.
///
/// Resources are immutable values. They are constructed at call sites
/// whenever a role needs to be expressed and are never cached.
///
/// # Example
///
/// ```
/// use gatehouse_rbac::Resource;
///
/// let doc = Resource::new("doc", "42");
/// assert_eq!(doc.kind().as_str(), "doc");
/// assert_eq!(doc.identifier().as_str(), "42");
/// assert_eq!(doc.to_string(), "doc:42");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource {
    kind: ResourceKind,
    identifier: ResourceId,
}

impl Resource {
    /// Create a resource from its kind and identifier.
    pub fn new(kind: impl Into<ResourceKind>, identifier: impl Into<ResourceId>) -> Self {
        Self {
            kind: kind.into(),
            identifier: identifier.into(),
        }
    }

    /// The root resource that contains every other resource.
    pub fn platform() -> Self {
        Self::new(PLATFORM_KIND, PLATFORM_ID)
    }

    /// Kind of this resource.
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Identifier of this resource.
    pub fn identifier(&self) -> &ResourceId {
        &self.identifier
    }

    /// Check if this is the platform resource.
    pub fn is_platform(&self) -> bool {
        self.kind.as_str() == PLATFORM_KIND && self.identifier.as_str() == PLATFORM_ID
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}
