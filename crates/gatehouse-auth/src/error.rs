//! Error types for authentication operations
//!
//! This module defines the errors returned by sessions, credential lookups,
//! group stores and configuration loading.

use gatehouse_rbac::RbacError;
use thiserror::Error;

/// Authentication error types.
///
/// Credential failures are deliberately coarse: a missing account, a lookup
/// error, a wrong secret and a delegate rejection all surface as
/// [`AuthError::InvalidCredentials`] so callers cannot tell which stage
/// failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No id or secret was presented
    #[error("Missing user credentials")]
    MissingCredentials,

    /// Id and secret do not identify a user
    #[error("Invalid user credentials")]
    InvalidCredentials,

    /// Credentials are valid but the account has not been verified
    #[error("User not verified")]
    NotVerified,

    /// Identity read from a scope that was never authenticated
    #[error("Scope has no authenticated identity")]
    MissingIdentity,

    /// The scope already carries an authenticated identity
    #[error("Scope is already authenticated")]
    AlreadyAuthenticated,

    /// The scope was canceled before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Secret read from an identity whose secret is held by a delegate
    #[error("Secret is not available for a federated identity")]
    SecretUnavailable,

    /// Identity holds none of the required roles
    #[error("User not authorized to make that request")]
    Unauthorized,

    /// Empty or malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Group store failure
    #[error("Group store error during {stage}: {message}")]
    Store {
        /// Store operation that failed.
        stage: &'static str,
        /// Backend error description.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Create a store error for the given operation.
    pub fn store(stage: &'static str, message: impl Into<String>) -> Self {
        AuthError::Store {
            stage,
            message: message.into(),
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Credential and authorization failures are expected and should not be
    /// logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::Store { .. } | AuthError::ConfigError(_) | AuthError::Internal(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::NotVerified => "NOT_VERIFIED",
            AuthError::MissingIdentity => "MISSING_IDENTITY",
            AuthError::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",
            AuthError::Cancelled => "CANCELLED",
            AuthError::SecretUnavailable => "SECRET_UNAVAILABLE",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AuthError::Store { .. } => "STORE_ERROR",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<RbacError> for AuthError {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::InvalidArgument(msg) => AuthError::InvalidArgument(msg.to_string()),
        }
    }
}
