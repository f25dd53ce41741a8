//! Client Fingerprinting
//!
//! A fingerprint summarizes client-identifying signals into one
//! comparable string. The engine concatenates its sources in
//! registration order; with no sources registered it yields the empty
//! string, so the fingerprint check at open becomes a no-op - callers
//! opting out of fingerprinting get no spurious invalidation.

use sha1::{Digest, Sha1};

/// One client-identifying signal for the current request context.
///
/// Pure: generating must not change request state, and repeated calls
/// within one request must return the same string.
pub trait FingerprintSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Fingerprint from the client's User-Agent header.
///
/// The raw header is hashed so the fingerprint stays fixed-width and
/// carries no readable client data into the store.
#[derive(Debug, Clone)]
pub struct UserAgentFingerprint {
    user_agent: String,
}

impl UserAgentFingerprint {
    /// Creates a source for the user agent seen on this request; pass
    /// an empty string when the header is missing.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl FingerprintSource for UserAgentFingerprint {
    fn generate(&self) -> String {
        hex::encode(Sha1::digest(self.user_agent.as_bytes()))
    }
}

/// Concatenates the registered sources into the comparable
/// fingerprint string.
#[derive(Default)]
pub struct FingerprintEngine {
    sources: Vec<Box<dyn FingerprintSource>>,
}

impl FingerprintEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source. Order matters: sources are concatenated in
    /// registration order.
    pub fn add_source(&mut self, source: Box<dyn FingerprintSource>) {
        self.sources.push(source);
    }

    /// Returns true if no sources are registered (fingerprinting is
    /// effectively disabled).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Computes the fingerprint for the current request context.
    #[must_use]
    pub fn generate(&self) -> String {
        self.sources
            .iter()
            .map(|source| source.generate())
            .collect()
    }
}

impl std::fmt::Debug for FingerprintEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintEngine")
            .field("sources", &self.sources.len())
            .finish()
    }
}
