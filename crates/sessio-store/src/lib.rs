//! Expiring session store contract and backends.
//!
//! Every backend persists the serialized session record under the
//! opaque id with a time-to-live. Expired and absent records surface
//! uniformly as `None`: the caller cannot (and must not) distinguish
//! "never existed" from "expired".
//!
//! # Modules
//!
//! - [`store`] - The [`Store`] contract
//! - [`memory`] - In-process [`MemoryStore`]
//! - [`file`] - File-backed [`FileStore`] with probabilistic GC
//! - [`cache`] - [`CacheStore`] adapter over an external cache
//! - [`error`] - Error types ([`StoreError`])
//!
//! # Example
//!
//! ```
//! use sessio_store::{MemoryStore, Store};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), sessio_store::StoreError> {
//! let store = MemoryStore::new();
//! let id = sessio_core::SessionId::new("abc123");
//! assert!(store.fetch(&id).await?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

// Re-export public API
pub use cache::{CacheClient, CacheStore};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{Store, DEFAULT_TTL};
