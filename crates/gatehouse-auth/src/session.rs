//! Sessions
//!
//! A [`Session`] verifies the `(id, secret)` pair presented on one inbound
//! call and binds the resulting identity into its [`Scope`].
//!
//! Verification order:
//!
//! 1. With a delegate configured, the delegate verifies the credential and
//!    must vouch for the presented id.
//! 2. The repository looks up the user by id. Its record supplies the id and
//!    the verified flag of the bound identity.
//! 3. Without a delegate, the stored secret must equal the presented one.
//!    With one, the bound identity is a [`FederatedUser`] whose secret
//!    cannot be read.
//! 4. Unless [`AuthOptions::ignore_unverified`] is set, the user must be
//!    verified.
//!
//! Steps 1 to 3 all fail with the same [`AuthError::InvalidCredentials`].
//!
//! A scope holds at most one identity along its ancestry: a session created
//! under an already authenticated scope cannot authenticate again.
//! Transport adapters extract the credentials and translate the outcome
//! into their own responses.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::bindings::AuthBindings;
use crate::error::{AuthError, AuthResult};
use crate::scope::Scope;
use crate::user::{FederatedUser, Identity, User};

/// Options for [`Session::authenticate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthOptions {
    ignore_unverified: bool,
}

impl AuthOptions {
    /// Default options: unverified accounts are rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept accounts that have not been verified yet.
    pub fn ignore_unverified(mut self) -> Self {
        self.ignore_unverified = true;
        self
    }

    /// Whether unverified accounts are accepted.
    pub fn ignores_unverified(&self) -> bool {
        self.ignore_unverified
    }
}

/// Per-call authentication scope.
///
/// # Example
///
/// ```rust,no_run
/// use gatehouse_auth::{AuthBindings, AuthOptions, Scope};
///
/// # async fn handle(bindings: AuthBindings, id: &str, secret: &str) -> gatehouse_auth::AuthResult<()> {
/// let session = bindings.session(&Scope::root());
/// let scope = session.authenticate(id, secret, AuthOptions::new()).await?;
/// let user = scope.identity()?;
/// // ... business logic with `scope` ...
/// session.cancel();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    bindings: AuthBindings,
    scope: Scope,
}

impl Session {
    /// Create a session whose scope is a child of `parent`.
    pub fn create(bindings: AuthBindings, parent: &Scope) -> Self {
        Self {
            bindings,
            scope: parent.child(),
        }
    }

    /// The session's scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Verify credentials and bind the identity into the session's scope.
    ///
    /// Returns the authenticated scope.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] if `user_id` or `secret` is empty
    /// - [`AuthError::InvalidCredentials`] on any lookup or verification failure
    /// - [`AuthError::NotVerified`] for an unverified account without the override
    /// - [`AuthError::AlreadyAuthenticated`] if the session, or the scope it
    ///   was created under, is already authenticated
    /// - [`AuthError::Cancelled`] if the scope is canceled mid-way
    #[tracing::instrument(
        name = "authenticate",
        skip(self, secret, options),
        fields(scope = %self.scope.id())
    )]
    pub async fn authenticate(
        &self,
        user_id: &str,
        secret: &str,
        options: AuthOptions,
    ) -> AuthResult<Scope> {
        if user_id.is_empty() || secret.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if self.scope.is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        let delegated = self.verify_with_delegate(user_id, secret).await?;
        let user = self.find_user(user_id).await?;

        let user: Identity = if delegated {
            Arc::new(FederatedUser::new(user.id()).with_verified(user.is_verified()))
        } else {
            check_secret(&user, secret)?;
            user
        };

        if !options.ignores_unverified() && !user.is_verified() {
            tracing::debug!("User not verified");
            return Err(AuthError::NotVerified);
        }

        self.scope.bind_identity(user)?;
        tracing::debug!("Session authenticated");

        Ok(self.scope.clone())
    }

    /// Ask the delegate for a verdict. Returns `false` when no delegate is
    /// configured.
    async fn verify_with_delegate(&self, user_id: &str, credential: &str) -> AuthResult<bool> {
        let Some(delegate) = self.bindings.delegate() else {
            return Ok(false);
        };

        match self.scope.run(delegate.verify(user_id, credential)).await? {
            Ok(Some(vouched)) => {
                if bool::from(vouched.id().as_bytes().ct_eq(user_id.as_bytes())) {
                    Ok(true)
                } else {
                    tracing::warn!("Delegate vouched for a different subject");
                    Err(AuthError::InvalidCredentials)
                }
            }
            Ok(None) => {
                tracing::debug!("Delegate rejected credentials");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Delegate verification failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn find_user(&self, user_id: &str) -> AuthResult<Identity> {
        let repository = self.bindings.repository();

        match self.scope.run(repository.find_auth_user(user_id)).await? {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::debug!("User not found");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Credential repository lookup failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Read the identity bound by a successful [`authenticate`](Self::authenticate).
    pub fn identity(&self) -> AuthResult<Identity> {
        self.scope.identity()
    }

    /// Release the session's scope, cancelling anything still running in it.
    pub fn cancel(&self) {
        self.scope.cancel();
    }
}

fn check_secret(user: &Identity, presented: &str) -> AuthResult<()> {
    let stored = user.secret().map_err(|e| {
        tracing::warn!(error = %e, "Stored secret unavailable for local comparison");
        AuthError::InvalidCredentials
    })?;

    if bool::from(stored.as_bytes().ct_eq(presented.as_bytes())) {
        Ok(())
    } else {
        tracing::debug!("Secret mismatch");
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CredentialRepository, RbacDelegate};
    use crate::user::LocalUser;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestRepository {
        users: HashMap<String, Identity>,
        lookups: AtomicUsize,
        fail: bool,
    }

    impl TestRepository {
        fn with_user(mut self, user: LocalUser) -> Self {
            self.users.insert(user.id().to_string(), Arc::new(user));
            self
        }
    }

    #[async_trait]
    impl CredentialRepository for TestRepository {
        async fn find_auth_user(&self, id: &str) -> AuthResult<Option<Identity>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::Internal("connection refused".to_string()));
            }
            Ok(self.users.get(id).cloned())
        }
    }

    struct TestDelegate {
        accept: bool,
        subject: Option<&'static str>,
    }

    impl TestDelegate {
        fn accepting() -> Self {
            Self {
                accept: true,
                subject: None,
            }
        }

        fn rejecting() -> Self {
            Self {
                accept: false,
                subject: None,
            }
        }
    }

    #[async_trait]
    impl RbacDelegate for TestDelegate {
        async fn verify(&self, id: &str, _credential: &str) -> AuthResult<Option<Identity>> {
            let subject = match self.subject {
                Some(subject) => subject,
                None => id,
            };
            Ok(self
                .accept
                .then(|| Arc::new(FederatedUser::new(subject)) as Identity))
        }
    }

    fn delegated_bindings(repo: Arc<TestRepository>, delegate: TestDelegate) -> AuthBindings {
        AuthBindings::builder()
            .repository(repo)
            .delegate(Arc::new(delegate))
            .build()
            .unwrap()
    }

    fn bindings(repo: Arc<TestRepository>) -> AuthBindings {
        AuthBindings::builder().repository(repo).build().unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_lookup() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let session = bindings(repo.clone()).session(&Scope::root());

        let err = session.authenticate("", "s1", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let err = session.authenticate("u1", "", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        assert_eq!(repo.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authenticate_binds_identity() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let session = bindings(repo).session(&Scope::root());

        let scope = session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap();
        assert_eq!(scope.identity().unwrap().id(), "u1");
        assert_eq!(session.identity().unwrap().id(), "u1");
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let session = bindings(repo).session(&Scope::root());

        let err = session.authenticate("u1", "nope", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(matches!(session.identity(), Err(AuthError::MissingIdentity)));
    }

    #[tokio::test]
    async fn test_repository_error_is_invalid_credentials() {
        let repo = Arc::new(TestRepository {
            fail: true,
            ..Default::default()
        });
        let session = bindings(repo).session(&Scope::root());

        let err = session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unverified_user() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", false)));
        let b = bindings(repo);

        let session = b.session(&Scope::root());
        let err = session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotVerified));

        let session = b.session(&Scope::root());
        let scope = session
            .authenticate("u1", "s1", AuthOptions::new().ignore_unverified())
            .await
            .unwrap();
        assert_eq!(scope.identity().unwrap().id(), "u1");
    }

    #[tokio::test]
    async fn test_second_authenticate_rejected() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let session = bindings(repo.clone()).session(&Scope::root());

        session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap();
        let err = session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap_err();

        assert!(matches!(err, AuthError::AlreadyAuthenticated));
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delegated_identity_hides_local_secret() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "local", true)));
        let session = delegated_bindings(repo, TestDelegate::accepting()).session(&Scope::root());

        let scope = session
            .authenticate("u1", "federated-token", AuthOptions::new())
            .await
            .unwrap();

        let user = scope.identity().unwrap();
        assert_eq!(user.id(), "u1");
        assert!(user.is_verified());
        assert!(matches!(user.secret(), Err(AuthError::SecretUnavailable)));
    }

    #[tokio::test]
    async fn test_delegated_identity_keeps_local_verified_flag() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "local", false)));
        let b = delegated_bindings(repo, TestDelegate::accepting());

        let err = b
            .session(&Scope::root())
            .authenticate("u1", "federated-token", AuthOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotVerified));

        let scope = b
            .session(&Scope::root())
            .authenticate("u1", "federated-token", AuthOptions::new().ignore_unverified())
            .await
            .unwrap();
        assert!(!scope.identity().unwrap().is_verified());
    }

    #[tokio::test]
    async fn test_delegate_subject_must_match_presented_id() {
        let repo = Arc::new(
            TestRepository::default()
                .with_user(LocalUser::new("alice", "a", true))
                .with_user(LocalUser::new("bob", "b", true)),
        );
        let delegate = TestDelegate {
            accept: true,
            subject: Some("bob"),
        };
        let session = delegated_bindings(repo.clone(), delegate).session(&Scope::root());

        let err = session
            .authenticate("alice", "bobs-token", AuthOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(matches!(session.identity(), Err(AuthError::MissingIdentity)));
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delegate_rejection_skips_repository() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let b = delegated_bindings(repo.clone(), TestDelegate::rejecting());

        let err = b
            .session(&Scope::root())
            .authenticate("u1", "s1", AuthOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_under_authenticated_scope_rejected() {
        let repo = Arc::new(
            TestRepository::default()
                .with_user(LocalUser::new("u1", "s1", true))
                .with_user(LocalUser::new("u2", "s2", true)),
        );
        let b = bindings(repo.clone());

        let outer = b.session(&Scope::root());
        let scope = outer.authenticate("u1", "s1", AuthOptions::new()).await.unwrap();

        let inner = b.session(&scope);
        let err = inner.authenticate("u2", "s2", AuthOptions::new()).await.unwrap_err();

        assert!(matches!(err, AuthError::AlreadyAuthenticated));
        assert_eq!(inner.identity().unwrap().id(), "u1");
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_session() {
        let repo = Arc::new(TestRepository::default().with_user(LocalUser::new("u1", "s1", true)));
        let session = bindings(repo).session(&Scope::root());

        session.cancel();
        let err = session.authenticate("u1", "s1", AuthOptions::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
        assert!(session.scope().is_cancelled());
    }

    #[test]
    fn test_options() {
        assert!(!AuthOptions::new().ignores_unverified());
        assert!(AuthOptions::new().ignore_unverified().ignores_unverified());
    }
}
