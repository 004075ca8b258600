//! Access-control error taxonomy.

use thiserror::Error;

/// Result type used across the access-control layer.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failure categories surfaced by authentication, authorization and the
/// operations they protect.
///
/// `Unauthenticated` and `Forbidden` are expected control outcomes and are
/// never retried. `Internal` carries a reason for logs only; adapters must not
/// leak it to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No identity, or the presented identity could not be verified.
    #[error("{0}")]
    Unauthenticated(String),

    /// Identity present, but it lacks the privilege or ownership required.
    #[error("{0}")]
    Forbidden(String),

    /// The request was malformed.
    #[error("{0}")]
    BadInput(String),

    /// Unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AccessError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this is an access decision (401/403) rather than a failure of
    /// the operation itself.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Unauthenticated(_) | Self::Forbidden(_))
    }
}
