//! Error types for the sessio-session crate.
//!
//! Configuration errors (entropy, hash algorithm) surface immediately
//! to the caller of `create`/`open`. Storage errors on save and delete
//! surface as [`SessionError::StoreUnavailable`] without corrupting
//! the in-memory transition: losing a session on storage failure is
//! preferred over leaking open state. The anomaly conditions (no data,
//! expired, fingerprint mismatch) are events, not errors.

use sessio_id::IdError;
use sessio_store::StoreError;
use thiserror::Error;

/// Errors raised by the session lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Id generation or algorithm configuration failed. Fatal; no
    /// fallback id scheme exists.
    #[error(transparent)]
    Id(#[from] IdError),

    /// The store failed during a save or delete. The in-memory state
    /// transition has still happened.
    #[error("Store unavailable during {operation}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A TTL policy cannot be changed while the session is open.
    #[error("Session is already open, {setting} cannot be changed")]
    AlreadyOpen { setting: &'static str },

    /// A TTL policy must be a positive duration.
    #[error("{setting} must be greater than zero")]
    InvalidTtl { setting: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_error_is_transparent() {
        let error: SessionError = IdError::UnsupportedAlgorithm {
            name: "md5".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "Unsupported hash algorithm: md5");
    }

    #[test]
    fn test_store_unavailable_names_operation() {
        let error = SessionError::StoreUnavailable {
            operation: "save",
            source: StoreError::Backend {
                cause: "down".to_string(),
            },
        };
        assert!(error.to_string().contains("save"));
    }
}
