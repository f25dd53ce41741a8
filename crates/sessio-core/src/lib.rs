//! sessio Core Library
//!
//! Shared types for the sessio session engine.
//!
//! # Modules
//!
//! - [`ids`] - Opaque session identifier ([`SessionId`])
//! - [`values`] - Namespaced key-value bundle ([`Values`])
//! - [`record`] - Persisted record format ([`SessionRecord`], [`SessionMetadata`])
//!
//! # Example
//!
//! ```
//! use sessio_core::{SessionId, Values, DEFAULT_NAMESPACE};
//!
//! let id = SessionId::new("8843d7f92416211de9ebb963ff4ce28125932878");
//!
//! let mut values = Values::new();
//! values.set(DEFAULT_NAMESPACE, "theme", "dark".into());
//! assert!(values.contains(DEFAULT_NAMESPACE, "theme"));
//! ```

pub mod ids;
pub mod record;
pub mod values;

// Re-export main types for convenient access
pub use ids::SessionId;
pub use record::{SessionMetadata, SessionRecord};
pub use values::{Values, DEFAULT_NAMESPACE};
