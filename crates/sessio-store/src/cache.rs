//! External Cache Adapter
//!
//! Bridges the session [`Store`] contract to any external cache that
//! can set/get/delete byte payloads with a TTL (memcached, Redis, an
//! in-process cache). The record is serialized as JSON bytes and the
//! TTL is passed through; the cache owns actual expiry.

use crate::error::StoreError;
use crate::store::{Store, DEFAULT_TTL};
use async_trait::async_trait;
use sessio_core::{SessionId, SessionRecord};
use std::time::Duration;

/// Minimal contract an external cache must satisfy.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the payload if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Removes the payload if present.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Store backend delegating persistence to an external cache.
pub struct CacheStore<C> {
    client: C,
    prefix: String,
    default_ttl: Duration,
}

impl<C: CacheClient> CacheStore<C> {
    /// Wraps a cache client with the default key prefix and TTL.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            prefix: "sess.".to_string(),
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Sets the key prefix, namespacing session records inside a
    /// shared cache.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the TTL used when a save passes zero.
    #[must_use]
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Borrows the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    fn key_for(&self, id: &SessionId) -> String {
        format!("{}{}", self.prefix, id)
    }
}

#[async_trait]
impl<C: CacheClient> Store for CacheStore<C> {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let key = self.key_for(id);
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            key: key.clone(),
            cause: e.to_string(),
        })?;

        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        self.client.set(&key, bytes, ttl).await
    }

    async fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let key = self.key_for(id);
        let Some(bytes) = self.client.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "corrupt cached session treated as absent");
                Ok(None)
            }
        }
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.client.delete(&self.key_for(id)).await
    }
}
