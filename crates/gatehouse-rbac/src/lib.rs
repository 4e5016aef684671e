//! # Gatehouse RBAC (Role / Resource / Group model)
//!
//! This crate provides the authorization vocabulary shared by gatehouse
//! stores and the services that call them.
//!
//! ## Overview
//!
//! - **Resources**: a protected entity, `(kind, identifier)`
//! - **Roles**: a free-form name bound to one resource
//! - **Roles collections**: "any of these" sets, and [`roles_for`] to fan one
//!   name across many resources
//! - **Groups**: the persisted users holding one role
//! - **Access queries**: parameterized predicates to embed in larger queries
//! - **Table layout**: the statements an SQL group store runs
//!
//! ## Architecture
//!
//! ```text
//! Role  = RoleName @ Resource
//! Group = Role + { user ids }
//!
//! Examples:
//!   "editor@doc:42"      - Editor of document 42
//!   "owner@platform:*"   - Owner of everything
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use gatehouse_rbac::{roles_for, AccessQuery, Resource, Role};
//!
//! // A role on a single resource
//! let editor = Role::new("editor", Resource::new("doc", "42"));
//! assert_eq!(editor.to_string(), "editor@doc:42");
//!
//! // "viewer" propagating from an account to one of its documents
//! let roles = roles_for("viewer", [Resource::new("account", "7"), Resource::new("doc", "42")]);
//! assert_eq!(roles.len(), 2);
//!
//! // Predicate for listing the documents a user can view
//! let predicate = AccessQuery::new("u1", "doc", "viewer").build().unwrap();
//! assert_eq!(predicate.params.len(), 3);
//! ```
//!
//! Nothing here performs I/O. Membership storage and credential checks live
//! in `gatehouse-auth`.

pub mod error;
pub mod query;
pub mod resources;
pub mod roles;
pub mod table;

// Re-export main types for convenience
pub use error::{RbacError, RbacResult};
pub use query::{AccessQuery, Predicate};
pub use resources::{Resource, ResourceId, ResourceKind};
pub use roles::{roles_for, Group, Role, RoleName, Roles};
