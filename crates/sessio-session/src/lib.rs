//! Session lifecycle and identity engine.
//!
//! This crate is the state machine at the heart of sessio: it issues
//! and validates the opaque session identifier, keeps the namespaced
//! value bundle, and enforces the security policies against session
//! fixation and hijacking (id rotation, client fingerprint matching,
//! absolute expiry).
//!
//! A session is bound to exactly one logical request: the caller opens
//! it once, reads and writes values, and closes it, at which point the
//! record is persisted through the configured store. Anomalies seen at
//! open (no data, expired, fingerprint mismatch) are delivered as
//! typed events to an [`EventSink`]; the lifecycle stays closed, and
//! the caller decides what happens next.
//!
//! # Modules
//!
//! - [`session`] - The [`Session`] state machine and [`SessionBuilder`]
//! - [`config`] - Lifecycle policy knobs ([`SessionConfig`])
//! - [`events`] - Anomaly events and sinks
//! - [`fingerprint`] - Client fingerprinting
//! - [`user`] - Logged-in marker wrapper ([`UserSession`])
//! - [`error`] - Error types ([`SessionError`])
//!
//! # Example
//!
//! ```
//! use sessio_session::Session;
//! use sessio_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), sessio_session::SessionError> {
//! let mut session = Session::builder(Arc::new(MemoryStore::new())).build();
//!
//! if !session.open(true).await? {
//!     // anomaly: stay closed, caller decides
//!     return Ok(());
//! }
//! session.set_value("theme", "dark".into());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod session;
pub mod user;

// Re-export public API
pub use config::SessionConfig;
pub use error::SessionError;
pub use events::{EventSink, NullSink, SessionEvent, TracingSink};
pub use fingerprint::{FingerprintEngine, FingerprintSource, UserAgentFingerprint};
pub use session::{Session, SessionBuilder};
pub use user::{UserSession, USER_ID_KEY};
