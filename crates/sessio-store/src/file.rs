//! File-Backed Store
//!
//! One JSON file per record, named `<prefix><id>` under a configured
//! directory. Expiry derives from the file's modification time plus
//! the backend's default TTL, not from a stored expiry field: retuning
//! the default TTL retroactively changes the apparent expiry of files
//! already on disk.
//!
//! Saves write a temp file in the same directory and rename it over
//! the record, so a concurrent fetch sees the old record or the new
//! one, never a torn write. Garbage collection is probabilistic: each
//! dropped instance sweeps the directory with probability
//! `gc_probability`/100 (default 1), amortizing cleanup cost across
//! many lifecycle instances. With probability `p` the expected number
//! of requests between sweeps is about 100/p, so expired files may
//! outlive their TTL in low-traffic deployments.

use crate::error::StoreError;
use crate::store::{Store, DEFAULT_TTL};
use async_trait::async_trait;
use rand::Rng;
use sessio_core::{SessionId, SessionRecord};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Default record file prefix.
pub const DEFAULT_PREFIX: &str = "sess_";

/// Default sweep probability, in percent.
const DEFAULT_GC_PROBABILITY: u8 = 1;

/// File-backed store with probabilistic garbage collection.
pub struct FileStore {
    dir: PathBuf,
    prefix: String,
    default_ttl: Duration,
    gc_probability: u8,
}

impl FileStore {
    /// Creates a store writing records under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            default_ttl: DEFAULT_TTL,
            gc_probability: DEFAULT_GC_PROBABILITY,
        }
    }

    /// Sets the record file prefix. Only files carrying the prefix are
    /// ever swept.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the default TTL used for mtime-based expiry.
    #[must_use]
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the sweep probability in percent (clamped to 0–100).
    /// 0 disables collection entirely, 100 sweeps on every teardown.
    #[must_use]
    pub fn with_gc_probability(mut self, gc_probability: u8) -> Self {
        self.gc_probability = gc_probability.min(100);
        self
    }

    /// Returns the directory records are written under.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, id))
    }

    /// Files with an mtime strictly before this are expired.
    fn expiry_threshold(&self) -> SystemTime {
        SystemTime::now()
            .checked_sub(self.default_ttl)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Deletes every expired record file carrying the configured
    /// prefix. Returns the number of files removed.
    ///
    /// Uses per-file unlinks only, so it is safe to run concurrently
    /// with fetches and saves from other instances pointed at the same
    /// directory.
    pub fn collect_garbage(&self) -> std::io::Result<usize> {
        let threshold = self.expiry_threshold();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&self.prefix) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else { continue };
            if !metadata.is_file() {
                continue;
            }
            let Ok(mtime) = metadata.modified() else { continue };
            if mtime < threshold && std::fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(dir = %self.dir.display(), removed, "swept expired session files");
        }
        Ok(removed)
    }

    fn io_error(&self, id: &SessionId, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: format!("{}{}", self.prefix, id),
            source,
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if self.gc_probability == 0 {
            return;
        }
        if rand::thread_rng().gen_range(1..=100) <= self.gc_probability {
            if let Err(e) = self.collect_garbage() {
                tracing::warn!(dir = %self.dir.display(), error = %e, "session file sweep failed");
            }
        }
    }
}

#[async_trait]
impl Store for FileStore {
    /// Persists the record. The `ttl` argument is accepted for
    /// contract compatibility but expiry is governed solely by file
    /// mtime plus the backend default TTL.
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            key: format!("{}{}", self.prefix, id),
            cause: e.to_string(),
        })?;

        // Write-then-rename keeps the overwrite atomic for concurrent
        // fetchers on the same directory.
        let tmp = self.dir.join(format!(".{}{}.tmp", Uuid::new_v4(), self.prefix));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.io_error(id, e))?;
        tokio::fs::rename(&tmp, self.path_for(id))
            .await
            .map_err(|e| self.io_error(id, e))?;
        Ok(())
    }

    async fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let path = self.path_for(id);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(id, e)),
        };

        let mtime = metadata.modified().map_err(|e| self.io_error(id, e))?;
        if mtime < self.expiry_threshold() {
            // Expired records surface as absent; drop the file eagerly.
            let _ = tokio::fs::remove_file(&path).await;
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(id, e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable session record treated as absent"
                );
                Ok(None)
            }
        }
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sessio_core::{SessionMetadata, Values, DEFAULT_NAMESPACE};
    use serde_json::json;

    fn record() -> SessionRecord {
        let mut values = Values::new();
        values.set(DEFAULT_NAMESPACE, "k", json!("v"));
        SessionRecord {
            values,
            metadata: SessionMetadata {
                first_trace: Utc::now(),
                last_trace: Utc::now(),
                regeneration_trace: Utc::now(),
                requests_count: 1,
                fingerprint: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_save_fetch_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);
        let id = SessionId::new("abc123");

        store.save(&id, &record(), Duration::ZERO).await.unwrap();

        let fetched = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(fetched.values.get(DEFAULT_NAMESPACE, "k"), Some(&json!("v")));
        assert!(dir.path().join("sess_abc123").exists());
    }

    #[tokio::test]
    async fn test_fetch_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);

        assert!(store.fetch(&SessionId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);
        let id = SessionId::new("abc");

        let mut second = record();
        second.metadata.requests_count = 2;

        store.save(&id, &record(), Duration::ZERO).await.unwrap();
        store.save(&id, &second, Duration::ZERO).await.unwrap();

        let fetched = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(fetched.metadata.requests_count, 2);

        // No temp files left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_expired_file_is_absent_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path())
            .with_gc_probability(0)
            .with_default_ttl(Duration::from_millis(1));
        let id = SessionId::new("abc");

        store.save(&id, &record(), Duration::ZERO).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.fetch(&id).await.unwrap().is_none());
        assert!(!dir.path().join("sess_abc").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);

        std::fs::write(dir.path().join("sess_bad"), b"not json").unwrap();

        assert!(store.fetch(&SessionId::new("bad")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);

        store.delete(&SessionId::new("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn test_gc_sweeps_expired_prefixed_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path())
            .with_gc_probability(0)
            .with_default_ttl(Duration::from_millis(1));

        store
            .save(&SessionId::new("old"), &record(), Duration::ZERO)
            .await
            .unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), b"keep me").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let removed = store.collect_garbage().unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.path().join("sess_old").exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[tokio::test]
    async fn test_gc_keeps_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_gc_probability(0);

        store
            .save(&SessionId::new("fresh"), &record(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.collect_garbage().unwrap(), 0);
        assert!(dir.path().join("sess_fresh").exists());
    }

    #[tokio::test]
    async fn test_drop_with_full_probability_sweeps() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path())
                .with_gc_probability(100)
                .with_default_ttl(Duration::from_millis(1));
            store
                .save(&SessionId::new("old"), &record(), Duration::ZERO)
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!dir.path().join("sess_old").exists());
    }

    #[tokio::test]
    async fn test_drop_with_zero_probability_never_sweeps() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path())
                .with_gc_probability(0)
                .with_default_ttl(Duration::from_millis(1));
            store
                .save(&SessionId::new("old"), &record(), Duration::ZERO)
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(dir.path().join("sess_old").exists());
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path())
            .with_gc_probability(0)
            .with_prefix("app.");
        let id = SessionId::new("abc");

        store.save(&id, &record(), Duration::ZERO).await.unwrap();

        assert!(dir.path().join("app.abc").exists());
        assert!(store.fetch(&id).await.unwrap().is_some());
    }
}
