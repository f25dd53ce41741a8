//! Error types for the sessio-id crate.

use thiserror::Error;

/// Errors raised while generating or configuring session identifiers.
///
/// Both variants are fatal to id generation: there is no silent
/// fallback to a weaker id scheme.
#[derive(Debug, Error)]
pub enum IdError {
    /// The entropy source could not produce output.
    #[error("Entropy source unavailable: {reason}")]
    EntropyUnavailable { reason: String },

    /// The configured hash algorithm is not supported.
    #[error("Unsupported hash algorithm: {name}")]
    UnsupportedAlgorithm { name: String },
}
