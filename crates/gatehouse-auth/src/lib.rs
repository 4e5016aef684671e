//! # Gatehouse Authentication
//!
//! This crate verifies the credentials presented on an inbound call and
//! answers whether the resulting identity holds a role over a resource.
//! It is transport-agnostic: HTTP and gRPC adapters extract the `(id, secret)`
//! pair and map errors to their own responses.
//!
//! ## Overview
//!
//! - **Sessions**: per-call verification with a fixed order (delegate,
//!   repository lookup, secret comparison, verified flag)
//! - **Scopes**: cancellable execution scopes carrying the bound identity
//! - **Delegation**: optional [`RbacDelegate`] for federated identity providers
//! - **Group stores**: membership persistence and checks, with a master
//!   identity bypass
//! - **Configuration**: [`AuthConfig`] and [`AuthBindings`], built once at startup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatehouse_auth::{
//!     require_any, AuthBindings, AuthConfig, AuthOptions, CredentialRepository,
//!     MemoryGroupStore, Scope,
//! };
//! use gatehouse_rbac::{Resource, Role};
//!
//! # async fn run(repository: Arc<dyn CredentialRepository>) -> gatehouse_auth::AuthResult<()> {
//! let bindings = AuthBindings::builder()
//!     .repository(repository)
//!     .config(AuthConfig::from_env()?)
//!     .build()?;
//! let groups = MemoryGroupStore::from_config(bindings.config());
//!
//! // Per inbound call
//! let session = bindings.session(&Scope::root());
//! let scope = session.authenticate("u1", "s1", AuthOptions::new()).await?;
//!
//! let editor = Role::new("editor", Resource::new("doc", "42"));
//! require_any(&groups, &scope, &editor.into()).await?;
//!
//! session.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Lookup failures, unknown users, wrong secrets and delegate rejections all
//! surface as [`AuthError::InvalidCredentials`]. Credential material is never
//! logged.

pub mod bindings;
pub mod config;
pub mod error;
pub mod groups;
pub mod hash;
pub mod master;
pub mod repository;
pub mod scope;
pub mod session;
pub mod user;

// Re-export main types
pub use bindings::{AuthBindings, AuthBindingsBuilder};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use groups::{require_any, GroupStore, GroupStoreStats, MemoryGroupStore, MembershipRecord};
pub use master::{is_master, MasterIdentity};
pub use repository::{CredentialRepository, RbacDelegate};
pub use scope::{identity, Scope};
pub use session::{AuthOptions, Session};
pub use user::{FederatedUser, Identity, LocalUser, User};
