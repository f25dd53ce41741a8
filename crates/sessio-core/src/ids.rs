//! Opaque Session Identifier
//!
//! The session id is an unguessable token correlating a client to its
//! stored state. It is produced by the identity provider (hash of an
//! entropy draw) and treated as opaque everywhere else: the newtype
//! prevents accidental mixing with other string-typed data.
//!
//! # Example
//!
//! ```
//! use sessio_core::SessionId;
//!
//! let id = SessionId::new("abc123");
//! assert_eq!(id.as_str(), "abc123");
//! assert_eq!(id.to_string(), "abc123");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque session identifier.
///
/// The token is assigned by the identity provider and is immutable for
/// the lifetime of a session except through explicit regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an existing token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the underlying token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
