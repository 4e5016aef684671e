//! Authentication bindings
//!
//! [`AuthBindings`] fixes which credential repository and delegate sessions
//! use, together with the loaded [`AuthConfig`]. It is built once at startup
//! and cloned into every request; nothing in it changes afterwards.

use std::fmt;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::repository::{CredentialRepository, RbacDelegate};
use crate::scope::Scope;
use crate::session::Session;

/// The collaborators every session is wired to.
#[derive(Clone)]
pub struct AuthBindings {
    repository: Arc<dyn CredentialRepository>,
    delegate: Option<Arc<dyn RbacDelegate>>,
    config: Arc<AuthConfig>,
}

impl fmt::Debug for AuthBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthBindings")
            .field("repository", &"<dyn CredentialRepository>")
            .field("delegate", &self.delegate.as_ref().map(|_| "<dyn RbacDelegate>"))
            .field("config", &self.config)
            .finish()
    }
}

impl AuthBindings {
    /// Start building bindings.
    pub fn builder() -> AuthBindingsBuilder {
        AuthBindingsBuilder::default()
    }

    /// Create a session whose scope derives from `parent`.
    pub fn session(&self, parent: &Scope) -> Session {
        Session::create(self.clone(), parent)
    }

    /// The credential repository.
    pub fn repository(&self) -> &Arc<dyn CredentialRepository> {
        &self.repository
    }

    /// The delegate, when one is configured.
    pub fn delegate(&self) -> Option<&Arc<dyn RbacDelegate>> {
        self.delegate.as_ref()
    }

    /// The loaded configuration. Group stores read the master identity
    /// from here.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Builder for [`AuthBindings`].
#[derive(Default)]
pub struct AuthBindingsBuilder {
    repository: Option<Arc<dyn CredentialRepository>>,
    delegate: Option<Arc<dyn RbacDelegate>>,
    config: AuthConfig,
}

impl AuthBindingsBuilder {
    /// Set the credential repository. Required.
    pub fn repository(mut self, repository: Arc<dyn CredentialRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Verify credentials through a delegate instead of comparing secrets.
    pub fn delegate(mut self, delegate: Arc<dyn RbacDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the bindings.
    ///
    /// # Errors
    ///
    /// [`AuthError::ConfigError`] when no repository was given or the
    /// configuration is invalid.
    pub fn build(self) -> AuthResult<AuthBindings> {
        self.config.validate()?;

        let repository = self.repository.ok_or_else(|| {
            AuthError::ConfigError("credential repository must be configured".to_string())
        })?;

        tracing::debug!(
            delegate = self.delegate.is_some(),
            master = self.config.master.is_some(),
            "Auth bindings configured"
        );

        Ok(AuthBindings {
            repository,
            delegate: self.delegate,
            config: Arc::new(self.config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Identity;
    use async_trait::async_trait;

    struct EmptyRepository;

    #[async_trait]
    impl CredentialRepository for EmptyRepository {
        async fn find_auth_user(&self, _id: &str) -> AuthResult<Option<Identity>> {
            Ok(None)
        }
    }

    #[test]
    fn test_missing_repository_is_config_error() {
        let err = AuthBindings::builder().build().unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = AuthBindings::builder()
            .repository(Arc::new(EmptyRepository))
            .config(AuthConfig::new().with_master("root", ""))
            .build()
            .unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    #[test]
    fn test_build_bindings() {
        let bindings = AuthBindings::builder()
            .repository(Arc::new(EmptyRepository))
            .config(AuthConfig::new().with_master("root", "s3cret"))
            .build()
            .unwrap();

        assert!(bindings.delegate().is_none());
        assert_eq!(bindings.config().master.as_ref().unwrap().id, "root");
    }
}
