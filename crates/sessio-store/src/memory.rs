//! In-Process Store
//!
//! Keeps records in a `HashMap` with an absolute expiry computed at
//! save time. Expired entries are dropped lazily on fetch. Intended
//! for single-process deployments and tests.

use crate::error::StoreError;
use crate::store::{to_chrono, Store, DEFAULT_TTL};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sessio_core::{SessionId, SessionRecord};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// In-memory store backend.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (SessionRecord, DateTime<Utc>)>>,
    default_ttl: Duration,
}

impl MemoryStore {
    /// Creates a store with the shared default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Creates a store with a custom default TTL.
    #[must_use]
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Number of live (possibly expired, not yet collected) records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            ttl
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = Utc::now()
            .checked_add_signed(to_chrono(self.effective_ttl(ttl)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().map_err(|_| StoreError::Backend {
            cause: "memory store lock poisoned".to_string(),
        })?;
        entries.insert(id.as_str().to_string(), (record.clone(), expires_at));
        Ok(())
    }

    async fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let expired = {
            let entries = self.entries.read().map_err(|_| StoreError::Backend {
                cause: "memory store lock poisoned".to_string(),
            })?;
            match entries.get(id.as_str()) {
                Some((record, expires_at)) => {
                    if Utc::now() < *expires_at {
                        return Ok(Some(record.clone()));
                    }
                    true
                }
                None => false,
            }
        };

        if expired {
            // Lazy collection of the expired entry.
            if let Ok(mut entries) = self.entries.write() {
                entries.remove(id.as_str());
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Backend {
            cause: "memory store lock poisoned".to_string(),
        })?;
        entries.remove(id.as_str());
        Ok(())
    }
}
