//! # Backend Error Types
//!
//! Failures crossing the remote boundary, split the way the callers need
//! to react to them: a structured rejection carries a message to show the
//! operator; a transport failure means "cannot confirm anything" and the
//! orchestration layer must fail conservatively.

use thiserror::Error;

/// Errors raised by [`crate::PosBackend`] implementations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The referenced entity does not exist remotely.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The remote procedure ran and rejected the request.
    #[error("remote procedure failed: {message}")]
    Rpc { message: String },

    /// A state conflict, e.g. opening a second session while one is
    /// already OPEN for the same user and warehouse.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Network or serialization failure; nothing can be assumed about
    /// the remote state.
    #[error("transport error: {0}")]
    Transport(String),
}

impl BackendError {
    /// True when the failure says nothing about remote state; the
    /// conservative branch for pre-flight checks.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

/// Convenience alias for Results with [`BackendError`].
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BackendError::NotFound {
            entity: "Session".to_string(),
            id: "s-1".to_string(),
        };
        assert_eq!(err.to_string(), "Session not found: s-1");

        assert!(BackendError::Transport("timeout".into()).is_transport());
        assert!(!BackendError::Rpc { message: "x".into() }.is_transport());
    }
}
