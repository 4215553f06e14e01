//! Error types for the access-control core

use thiserror::Error;

/// Access-control errors
#[derive(Debug, Error)]
pub enum RbacError {
    /// Malformed or missing input to a management operation
    #[error("invalid input: {0}")]
    Validation(String),

    /// A uniqueness invariant was violated by a concurrent writer
    #[error("duplicate entity: {0}")]
    Duplicate(String),

    /// Attempted deletion of a system role
    #[error("protected role: {0}")]
    ProtectedRole(String),

    /// A referenced role, user or permission does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Credential handling failure
    #[error("credential error: {0}")]
    Credential(#[from] atrium_credential::CredentialError),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, RbacError>;
