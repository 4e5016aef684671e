//! Request scopes
//!
//! A [`Scope`] is the per-call execution context a session works in. It
//! carries a cancellation signal that propagates from parent to children and
//! a typed slot for the authenticated identity, set at most once.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::user::Identity;

struct ScopeInner {
    id: Uuid,
    parent: Option<Scope>,
    cancelled: AtomicBool,
    notify: Notify,
    children: Mutex<Vec<Weak<ScopeInner>>>,
    identity: OnceLock<Identity>,
}

/// Cancellable execution scope with an optional bound identity.
///
/// Cloning a scope yields another handle to the same scope.
///
/// # Example
///
/// ```
/// use gatehouse_auth::Scope;
///
/// let root = Scope::root();
/// let child = root.child();
///
/// root.cancel();
/// assert!(child.is_cancelled());
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    fn with_parent(parent: Option<Scope>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: Uuid::now_v7(),
                parent,
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
                children: Mutex::new(Vec::new()),
                identity: OnceLock::new(),
            }),
        }
    }

    /// Create a top-level scope.
    pub fn root() -> Self {
        Self::with_parent(None)
    }

    /// Derive a child scope, canceled whenever this scope is.
    pub fn child(&self) -> Self {
        let child = Self::with_parent(Some(self.clone()));

        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }

        // Checked after registering so a concurrent cancel cannot be missed.
        if self.is_cancelled() {
            child.cancel();
        }

        child
    }

    /// Unique id of this scope, for log correlation.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Cancel this scope and every scope derived from it.
    ///
    /// Pending [`run`](Self::run) calls resolve with
    /// [`AuthError::Cancelled`]. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inner.notify.notify_waiters();

        let children: Vec<Weak<ScopeInner>> = {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *children)
        };

        for child in children.iter().filter_map(Weak::upgrade) {
            Scope { inner: child }.cancel();
        }

        tracing::trace!(scope = %self.inner.id, "Scope cancelled");
    }

    /// Check if the scope has been canceled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until the scope is canceled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Run a future, abandoning it if the scope is canceled first.
    ///
    /// The abandoned future is dropped, which releases whatever it was
    /// waiting on.
    pub async fn run<F>(&self, fut: F) -> AuthResult<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(AuthError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(AuthError::Cancelled),
            output = fut => Ok(output),
        }
    }

    /// The identity authenticated in this scope or one of its ancestors.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingIdentity`] if no identity has been bound.
    pub fn identity(&self) -> AuthResult<Identity> {
        if let Some(identity) = self.inner.identity.get() {
            return Ok(identity.clone());
        }

        match &self.inner.parent {
            Some(parent) => parent.identity(),
            None => Err(AuthError::MissingIdentity),
        }
    }

    /// Check if an identity is bound to this scope or one of its ancestors.
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_ok()
    }

    pub(crate) fn bind_identity(&self, identity: Identity) -> AuthResult<()> {
        self.inner
            .identity
            .set(identity)
            .map_err(|_| AuthError::AlreadyAuthenticated)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .field("authenticated", &self.inner.identity.get().is_some())
            .finish()
    }
}

/// Read the identity bound to a scope.
pub fn identity(scope: &Scope) -> AuthResult<Identity> {
    scope.identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{LocalUser, User};
    use std::time::Duration;

    #[test]
    fn test_cancel_propagates_to_children() {
        let root = Scope::root();
        let child = root.child();
        let grandchild = child.child();

        child.cancel();
        assert!(!root.is_cancelled());
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_child_of_cancelled_scope_starts_cancelled() {
        let root = Scope::root();
        root.cancel();
        assert!(root.child().is_cancelled());
    }

    #[test]
    fn test_identity_missing_before_bind() {
        let scope = Scope::root();
        assert!(matches!(scope.identity(), Err(AuthError::MissingIdentity)));
        assert!(!scope.is_authenticated());
    }

    #[test]
    fn test_identity_bound_once() {
        let scope = Scope::root();
        scope
            .bind_identity(Arc::new(LocalUser::new("u1", "s1", true)))
            .unwrap();

        let err = scope
            .bind_identity(Arc::new(LocalUser::new("u2", "s2", true)))
            .unwrap_err();
        assert!(matches!(err, AuthError::AlreadyAuthenticated));
        assert_eq!(identity(&scope).unwrap().id(), "u1");
    }

    #[test]
    fn test_children_inherit_identity() {
        let scope = Scope::root();
        scope
            .bind_identity(Arc::new(LocalUser::new("u1", "s1", true)))
            .unwrap();

        assert_eq!(scope.child().identity().unwrap().id(), "u1");
        assert!(Scope::root().child().identity().is_err());
    }

    #[tokio::test]
    async fn test_run_completes() {
        let scope = Scope::root();
        let value = scope.run(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_on_cancelled_scope() {
        let scope = Scope::root();
        scope.cancel();
        assert!(matches!(scope.run(async { 7 }).await, Err(AuthError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_run() {
        let root = Scope::root();
        let scope = root.child();

        let canceller = root.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = scope.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(AuthError::Cancelled)));
    }
}
