//! Error types for the authorization model.

use thiserror::Error;

/// Errors produced while constructing authorization queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RbacError {
    /// A required query input was empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type for authorization model operations.
pub type RbacResult<T> = Result<T, RbacError>;
