//! Error types for the sessio-store crate.

use thiserror::Error;

/// Errors raised by store backends.
///
/// `fetch` failures are downgraded to "absent" by the session
/// lifecycle (a request must never crash on storage trouble);
/// `save`/`delete` failures are surfaced to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem or socket failure while touching a record.
    #[error("I/O failure for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be serialized or deserialized.
    #[error("Serialization failure for key {key}: {cause}")]
    Serialization { key: String, cause: String },

    /// The external cache backend reported a failure.
    #[error("Cache backend failure: {cause}")]
    Backend { cause: String },
}
