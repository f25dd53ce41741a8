//! Store Contract
//!
//! The session lifecycle persists through this trait and nothing else.
//! Backends must guarantee atomic overwrite on `save`: a concurrent
//! `fetch` sees the old record or the new one, never a torn write.
//! Cross-request races between fetch-at-open and save-at-close resolve
//! as last-writer-wins; no optimistic locking is provided.

use crate::error::StoreError;
use async_trait::async_trait;
use sessio_core::{SessionId, SessionRecord};
use std::time::Duration;

/// Default record time-to-live shared by the provided backends.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1440);

/// Expiring key-value persistence for session records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists the record under `id` with the given time-to-live.
    ///
    /// A zero `ttl` means "use the backend default". Any existing
    /// record is overwritten atomically.
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Returns the record if present and not expired.
    ///
    /// Expired and absent records both yield `Ok(None)`.
    async fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Removes the record if present. Deleting an absent id is not an
    /// error.
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// Converts a std TTL into chrono arithmetic, saturating instead of
/// failing on out-of-range values.
pub(crate) fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500))
}
