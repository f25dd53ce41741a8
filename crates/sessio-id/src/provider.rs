//! Id Provider
//!
//! Ties together an entropy source, a hash algorithm and an identifier
//! carrier: entropy is drawn, hashed into the opaque token, and handed
//! to the carrier for the client. Entropy and algorithm failures are
//! fatal; there is no fallback id scheme.

use crate::carrier::IdCarrier;
use crate::entropy::EntropySource;
use crate::error::IdError;
use crate::hash::HashAlgorithm;
use sessio_core::SessionId;

/// Generates, stores and clears the opaque session identifier.
pub struct IdProvider {
    carrier: Box<dyn IdCarrier>,
    entropy: Box<dyn EntropySource>,
    algorithm: HashAlgorithm,
}

impl IdProvider {
    /// Creates a provider with the default hash algorithm (SHA-1).
    #[must_use]
    pub fn new(carrier: Box<dyn IdCarrier>, entropy: Box<dyn EntropySource>) -> Self {
        Self {
            carrier,
            entropy,
            algorithm: HashAlgorithm::default(),
        }
    }

    /// Selects the hash algorithm applied to the entropy draw.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Generates a fresh id, stores it in the carrier and returns it.
    ///
    /// # Errors
    ///
    /// [`IdError::EntropyUnavailable`] when the entropy source cannot
    /// produce output.
    pub fn generate_id(&mut self) -> Result<SessionId, IdError> {
        let entropy = self.entropy.generate()?;
        let id = SessionId::new(self.algorithm.digest(&entropy));
        self.carrier.set(&id);
        tracing::debug!(algorithm = self.algorithm.as_str(), "generated new session id");
        Ok(id)
    }

    /// Stores an externally chosen id in the carrier.
    pub fn set_id(&mut self, id: &SessionId) {
        self.carrier.set(id);
    }

    /// Returns the current id, if the carrier holds one.
    #[must_use]
    pub fn id(&self) -> Option<SessionId> {
        self.carrier.get()
    }

    /// Returns true if the carrier holds an id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.carrier.exists()
    }

    /// Clears the id from the carrier.
    pub fn clear_id(&mut self) {
        self.carrier.clear();
    }

    /// Returns the configured hash algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Borrows the carrier, e.g. to read the pending Set-Cookie header.
    #[must_use]
    pub fn carrier(&self) -> &dyn IdCarrier {
        self.carrier.as_ref()
    }

    /// Mutably borrows the carrier, e.g. to feed it a request header.
    pub fn carrier_mut(&mut self) -> &mut dyn IdCarrier {
        self.carrier.as_mut()
    }
}

impl std::fmt::Debug for IdProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdProvider")
            .field("algorithm", &self.algorithm)
            .field("has_id", &self.has_id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::MemoryCarrier;
    use crate::entropy::{FileEntropy, OsEntropy};

    fn provider() -> IdProvider {
        IdProvider::new(Box::new(MemoryCarrier::new()), Box::new(OsEntropy))
    }

    #[test]
    fn test_generate_id_stores_in_carrier() {
        let mut provider = provider();
        assert!(!provider.has_id());

        let id = provider.generate_id().unwrap();
        assert_eq!(provider.id(), Some(id));
        assert!(provider.has_id());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let mut provider = provider();
        let a = provider.generate_id().unwrap();
        let b = provider.generate_id().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sha1_token_shape() {
        let mut provider = provider();
        let id = provider.generate_id().unwrap();

        assert_eq!(id.as_str().len(), 40);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_algorithm_changes_token_length() {
        let mut provider = provider().with_algorithm(HashAlgorithm::Sha256);
        let id = provider.generate_id().unwrap();
        assert_eq!(id.as_str().len(), 64);
    }

    #[test]
    fn test_entropy_failure_propagates_and_keeps_carrier_empty() {
        let mut provider = IdProvider::new(
            Box::new(MemoryCarrier::new()),
            Box::new(FileEntropy::new("/nonexistent/entropy", 16)),
        );

        let error = provider.generate_id().unwrap_err();
        assert!(matches!(error, IdError::EntropyUnavailable { .. }));
        assert!(!provider.has_id());
    }

    #[test]
    fn test_set_and_clear_delegate_to_carrier() {
        let mut provider = provider();
        provider.set_id(&SessionId::new("abc123"));
        assert_eq!(provider.id(), Some(SessionId::new("abc123")));

        provider.clear_id();
        assert!(!provider.has_id());
    }
}
