//! Session identity provider for sessio.
//!
//! This crate owns everything about the opaque session identifier:
//! where its entropy comes from, how it is hashed into a token, and
//! how it travels between client and server.
//!
//! # Modules
//!
//! - [`entropy`] - Entropy sources ([`OsEntropy`], [`FileEntropy`])
//! - [`hash`] - Configurable id hash algorithm ([`HashAlgorithm`])
//! - [`carrier`] - Identifier carriers ([`CookieCarrier`], [`MemoryCarrier`])
//! - [`provider`] - The [`IdProvider`] orchestrator
//! - [`error`] - Error types ([`IdError`])
//!
//! # Example
//!
//! ```
//! use sessio_id::{IdProvider, MemoryCarrier, OsEntropy};
//!
//! let mut provider = IdProvider::new(Box::new(MemoryCarrier::new()), Box::new(OsEntropy));
//! let id = provider.generate_id().unwrap();
//! assert_eq!(provider.id(), Some(id));
//! ```

pub mod carrier;
pub mod entropy;
pub mod error;
pub mod hash;
pub mod provider;

// Re-export public API
pub use carrier::{CookieCarrier, IdCarrier, MemoryCarrier};
pub use entropy::{EntropySource, FileEntropy, OsEntropy};
pub use error::IdError;
pub use hash::HashAlgorithm;
pub use provider::IdProvider;
