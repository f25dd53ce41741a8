//! Persisted Record Format
//!
//! A session is persisted as one atomic unit: the namespaced values
//! together with the lifecycle metadata. The metadata keys are fixed
//! (camelCase on the wire) and must round-trip unchanged through every
//! store backend; the enclosing serialization is a backend concern.

use crate::values::Values;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle metadata persisted alongside the session values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// When the session was created. Set exactly once.
    pub first_trace: DateTime<Utc>,

    /// Last successful open or close.
    pub last_trace: DateTime<Utc>,

    /// When the id was last rotated.
    pub regeneration_trace: DateTime<Utc>,

    /// Number of successful opens, starting at 1 on create.
    pub requests_count: u64,

    /// Client fingerprint snapshot captured at create/open.
    pub fingerprint: String,
}

/// The full persisted session record: values plus metadata.
///
/// Stores must write and read this as a single atomic unit; a fetch
/// must never observe values without their metadata or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub values: Values,
    pub metadata: SessionMetadata,
}
