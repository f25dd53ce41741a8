//! Session Lifecycle State Machine
//!
//! A [`Session`] moves between `Closed` (initial and terminal) and
//! `Open`. `create` starts a fresh session; `open` validates a
//! returning client through a fixed check order (no data, then expiry,
//! then fingerprint - each later check presupposes the record loaded
//! cleanly); `close` applies the rotation policy and persists; and
//! `destroy` removes every trace. Id rotation happens at most once per
//! open-close span.
//!
//! All collaborators are injected at construction through
//! [`SessionBuilder`]; there are no implicit defaults constructed
//! behind the caller's back beyond the documented builder fallbacks.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{EventSink, NullSink, SessionEvent};
use crate::fingerprint::{FingerprintEngine, FingerprintSource};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sessio_core::{SessionId, SessionMetadata, SessionRecord, Values, DEFAULT_NAMESPACE};
use sessio_id::{CookieCarrier, EntropySource, HashAlgorithm, IdCarrier, IdProvider, OsEntropy};
use sessio_store::Store;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500))
}

/// Server-side session bound to one logical request.
pub struct Session {
    store: Arc<dyn Store>,
    id_provider: IdProvider,
    fingerprints: FingerprintEngine,
    sink: Arc<dyn EventSink>,
    config: SessionConfig,

    values: Values,
    first_trace: Option<DateTime<Utc>>,
    last_trace: Option<DateTime<Utc>>,
    regeneration_trace: Option<DateTime<Utc>>,
    requests_count: u64,
    fingerprint: String,
    opened: bool,
    /// At-most-once rotation guard for the current open-close span.
    id_regenerated: bool,
}

impl Session {
    /// Starts building a session around the given store.
    #[must_use]
    pub fn builder(store: Arc<dyn Store>) -> SessionBuilder {
        SessionBuilder::new(store)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Creates a new session: fresh id, empty values, traces stamped
    /// now, request count 1, fingerprint snapshot taken.
    ///
    /// Calling this on an existing session overwrites it. Entropy and
    /// algorithm failures propagate and leave the lifecycle closed.
    pub fn create(&mut self) -> Result<(), SessionError> {
        let id = self.id_provider.generate_id()?;

        let now = Utc::now();
        self.values.clear();
        self.first_trace = Some(now);
        self.last_trace = Some(now);
        self.regeneration_trace = Some(now);
        self.requests_count = 1;
        self.fingerprint = self.fingerprints.generate();
        self.opened = true;
        self.id_regenerated = false;

        tracing::debug!(session_id = %id, "session created");
        Ok(())
    }

    /// Opens the session for the current request.
    ///
    /// Idempotent while open. Without a carried id the session is
    /// created when `create_if_absent` is set, otherwise it stays
    /// closed. With a carried id the stored record is validated in
    /// fixed order - no data, expiry, fingerprint - and any anomaly is
    /// delivered to the event sink while the lifecycle stays closed
    /// (unless the recreate-on-anomaly opt-in is enabled).
    ///
    /// Returns the final opened flag. Store failures on fetch are
    /// treated as absent records, never as request-crashing errors.
    pub async fn open(&mut self, create_if_absent: bool) -> Result<bool, SessionError> {
        if self.opened {
            return Ok(true);
        }

        if !self.id_provider.has_id() {
            if create_if_absent {
                self.create()?;
            }
            return Ok(self.opened);
        }

        let Some(id) = self.id_provider.id() else {
            return Ok(false);
        };

        self.load(&id).await;
        let now = Utc::now();

        let anomaly = if self.first_trace.is_none() {
            Some(SessionEvent::NoDataOrExpired { id })
        } else if self.is_expired_at(now) {
            Some(SessionEvent::Expired {
                id,
                last_trace: self.last_trace.unwrap_or(now),
            })
        } else {
            let actual = self.fingerprints.generate();
            if actual != self.fingerprint {
                Some(SessionEvent::InvalidFingerprint {
                    id,
                    expected: self.fingerprint.clone(),
                    actual,
                })
            } else {
                None
            }
        };

        match anomaly {
            Some(event) => {
                tracing::debug!(session_id = %event.id(), kind = event.kind(), "open rejected");
                self.sink.notify(&event);
                if self.config.recreate_on_anomaly {
                    self.create()?;
                }
            }
            None => {
                self.opened = true;
                self.requests_count += 1;
                self.last_trace = Some(now);
            }
        }

        Ok(self.opened)
    }

    /// Closes the session: applies the rotation policy, stamps the
    /// last trace and persists the record, then clears values and
    /// transitions to closed.
    ///
    /// A save failure is returned but never blocks the in-memory
    /// transition: losing a session on storage failure beats leaking
    /// open state.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        if !self.opened {
            return Ok(());
        }

        let rotation = if self.should_regenerate_id(Utc::now()) {
            self.regenerate_id().await.map(|_| ())
        } else {
            Ok(())
        };

        self.last_trace = Some(Utc::now());
        let saved = self.save().await;

        self.values.clear();
        self.opened = false;
        rotation.and(saved)
    }

    /// Destroys the session: clears values, deletes the store record
    /// and empties the identifier carrier. Usable from either state.
    pub async fn destroy(&mut self) -> Result<(), SessionError> {
        self.values.clear();

        let result = match self.id_provider.id() {
            Some(id) => {
                self.store
                    .delete(&id)
                    .await
                    .map_err(|source| SessionError::StoreUnavailable {
                        operation: "delete",
                        source,
                    })
            }
            None => Ok(()),
        };

        self.id_provider.clear_id();
        self.opened = false;
        result
    }

    /// Rotates the session id: deletes the record under the old id and
    /// generates a fresh one, to be persisted at close. At most one
    /// rotation happens per open-close span; further calls are no-ops
    /// returning `Ok(false)`.
    ///
    /// Public so callers can force rotation whenever the user's
    /// privilege level changes (the classic fixation mitigation).
    pub async fn regenerate_id(&mut self) -> Result<bool, SessionError> {
        if self.id_regenerated {
            return Ok(false);
        }

        if let Some(old) = self.id_provider.id() {
            // The new id must be issued even when the old record cannot
            // be removed; the orphan expires via the store's TTL.
            if let Err(e) = self.store.delete(&old).await {
                tracing::warn!(session_id = %old, error = %e, "failed to delete rotated-out record");
            }
        }

        let new_id = self.id_provider.generate_id()?;
        self.regeneration_trace = Some(Utc::now());
        self.id_regenerated = true;

        tracing::debug!(session_id = %new_id, "session id rotated");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    /// Current session id, if the carrier holds one.
    #[must_use]
    pub fn id(&self) -> Option<SessionId> {
        self.id_provider.id()
    }

    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    #[must_use]
    pub fn first_trace(&self) -> Option<DateTime<Utc>> {
        self.first_trace
    }

    #[must_use]
    pub fn last_trace(&self) -> Option<DateTime<Utc>> {
        self.last_trace
    }

    #[must_use]
    pub fn regeneration_trace(&self) -> Option<DateTime<Utc>> {
        self.regeneration_trace
    }

    #[must_use]
    pub fn requests_count(&self) -> u64 {
        self.requests_count
    }

    /// The fingerprint snapshot captured at create or last validated
    /// open.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether the session's own TTL has elapsed at `now`.
    ///
    /// The boundary is inclusive: exactly `last_trace + ttl` is
    /// expired, one tick before is valid.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_trace {
            Some(last) => match last.checked_add_signed(to_chrono(self.config.ttl)) {
                Some(deadline) => now >= deadline,
                None => false,
            },
            None => true,
        }
    }

    /// Borrows the identity provider, e.g. to read the pending
    /// Set-Cookie header off a cookie carrier.
    #[must_use]
    pub fn id_provider(&self) -> &IdProvider {
        &self.id_provider
    }

    /// Mutably borrows the identity provider, e.g. to feed a request
    /// header to a cookie carrier before open.
    pub fn id_provider_mut(&mut self) -> &mut IdProvider {
        &mut self.id_provider
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reconfigures the session TTL. Must happen before open.
    pub fn set_ttl(&mut self, ttl: Duration) -> Result<(), SessionError> {
        if self.opened {
            return Err(SessionError::AlreadyOpen { setting: "ttl" });
        }
        if ttl.is_zero() {
            return Err(SessionError::InvalidTtl { setting: "ttl" });
        }
        self.config.ttl = ttl;
        Ok(())
    }

    /// Reconfigures time-based id rotation; `None` disables it. Must
    /// happen before open.
    pub fn set_id_ttl(&mut self, id_ttl: Option<Duration>) -> Result<(), SessionError> {
        if self.opened {
            return Err(SessionError::AlreadyOpen { setting: "id_ttl" });
        }
        self.config.id_ttl = id_ttl;
        Ok(())
    }

    /// Reconfigures count-based id rotation; `None` disables it.
    pub fn set_id_requests_limit(&mut self, limit: Option<u64>) {
        self.config.id_requests_limit = limit;
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Sets a value in the default namespace.
    pub fn set_value(&mut self, key: &str, value: Value) {
        self.values.set(DEFAULT_NAMESPACE, key, value);
    }

    /// Sets a value in the given namespace.
    pub fn set_value_in(&mut self, namespace: &str, key: &str, value: Value) {
        self.values.set(namespace, key, value);
    }

    /// Gets a value from the default namespace.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(DEFAULT_NAMESPACE, key)
    }

    /// Gets a value from the given namespace.
    #[must_use]
    pub fn value_in(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.values.get(namespace, key)
    }

    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains(DEFAULT_NAMESPACE, key)
    }

    #[must_use]
    pub fn has_value_in(&self, namespace: &str, key: &str) -> bool {
        self.values.contains(namespace, key)
    }

    /// Removes a value from the default namespace, returning it.
    pub fn remove_value(&mut self, key: &str) -> Option<Value> {
        self.values.remove(DEFAULT_NAMESPACE, key)
    }

    pub fn remove_value_in(&mut self, namespace: &str, key: &str) -> Option<Value> {
        self.values.remove(namespace, key)
    }

    /// Gets and removes a value in one step (one-shot accessor).
    pub fn take_value(&mut self, key: &str) -> Option<Value> {
        self.values.take(DEFAULT_NAMESPACE, key)
    }

    pub fn take_value_in(&mut self, namespace: &str, key: &str) -> Option<Value> {
        self.values.take(namespace, key)
    }

    /// All values of the default namespace.
    #[must_use]
    pub fn values(&self) -> Option<&BTreeMap<String, Value>> {
        self.values.namespace(DEFAULT_NAMESPACE)
    }

    #[must_use]
    pub fn values_in(&self, namespace: &str) -> Option<&BTreeMap<String, Value>> {
        self.values.namespace(namespace)
    }

    /// Drops an entire namespace.
    pub fn clear_namespace(&mut self, namespace: &str) {
        self.values.clear_namespace(namespace);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Reconstitutes state from the store. A fetch failure is logged
    /// and treated as an absent record: the no-data anomaly path
    /// handles it, a request never crashes on storage trouble.
    async fn load(&mut self, id: &SessionId) {
        // Reset before loading so a retried open cannot see stale
        // metadata from a previous attempt.
        self.first_trace = None;
        self.last_trace = None;
        self.regeneration_trace = None;
        self.requests_count = 0;
        self.fingerprint = String::new();
        self.values.clear();

        match self.store.fetch(id).await {
            Ok(Some(record)) => {
                self.first_trace = Some(record.metadata.first_trace);
                self.last_trace = Some(record.metadata.last_trace);
                self.regeneration_trace = Some(record.metadata.regeneration_trace);
                self.requests_count = record.metadata.requests_count;
                self.fingerprint = record.metadata.fingerprint;
                self.values = record.values;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "fetch failed, treating record as absent");
            }
        }
    }

    async fn save(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.id_provider.id() else {
            tracing::warn!("close without a session id, nothing persisted");
            return Ok(());
        };

        let now = Utc::now();
        let record = SessionRecord {
            values: self.values.clone(),
            metadata: SessionMetadata {
                first_trace: self.first_trace.unwrap_or(now),
                last_trace: self.last_trace.unwrap_or(now),
                regeneration_trace: self.regeneration_trace.unwrap_or(now),
                requests_count: self.requests_count,
                fingerprint: self.fingerprint.clone(),
            },
        };

        self.store
            .save(&id, &record, self.config.ttl)
            .await
            .map_err(|source| SessionError::StoreUnavailable {
                operation: "save",
                source,
            })
    }

    /// Rotation policy: request-count limit reached, or the last
    /// rotation is older than the id TTL.
    fn should_regenerate_id(&self, now: DateTime<Utc>) -> bool {
        if let Some(limit) = self.config.id_requests_limit {
            if self.requests_count >= limit {
                return true;
            }
        }

        if let (Some(id_ttl), Some(regenerated)) = (self.config.id_ttl, self.regeneration_trace) {
            if let Some(deadline) = regenerated.checked_add_signed(to_chrono(id_ttl)) {
                if now > deadline {
                    return true;
                }
            }
        }

        false
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("opened", &self.opened)
            .field("requests_count", &self.requests_count)
            .field("id_regenerated", &self.id_regenerated)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Session`] from its collaborators.
///
/// Only the store is required. The carrier defaults to a
/// [`CookieCarrier`], entropy to the OS RNG, the hash algorithm to
/// SHA-1, the event sink to [`NullSink`], and the fingerprint engine
/// starts empty.
pub struct SessionBuilder {
    store: Arc<dyn Store>,
    carrier: Option<Box<dyn IdCarrier>>,
    entropy: Option<Box<dyn EntropySource>>,
    algorithm: HashAlgorithm,
    sink: Arc<dyn EventSink>,
    sources: Vec<Box<dyn FingerprintSource>>,
    config: SessionConfig,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            carrier: None,
            entropy: None,
            algorithm: HashAlgorithm::default(),
            sink: Arc::new(NullSink),
            sources: Vec::new(),
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn carrier(mut self, carrier: Box<dyn IdCarrier>) -> Self {
        self.carrier = Some(carrier);
        self
    }

    #[must_use]
    pub fn entropy(mut self, entropy: Box<dyn EntropySource>) -> Self {
        self.entropy = Some(entropy);
        self
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a fingerprint source; call repeatedly to add more.
    #[must_use]
    pub fn fingerprint_source(mut self, source: Box<dyn FingerprintSource>) -> Self {
        self.sources.push(source);
        self
    }

    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> Session {
        let carrier = self
            .carrier
            .unwrap_or_else(|| Box::new(CookieCarrier::default()));
        let entropy = self.entropy.unwrap_or_else(|| Box::new(OsEntropy));

        let mut fingerprints = FingerprintEngine::new();
        for source in self.sources {
            fingerprints.add_source(source);
        }

        Session {
            store: self.store,
            id_provider: IdProvider::new(carrier, entropy).with_algorithm(self.algorithm),
            fingerprints,
            sink: self.sink,
            config: self.config,
            values: Values::new(),
            first_trace: None,
            last_trace: None,
            regeneration_trace: None,
            requests_count: 0,
            fingerprint: String::new(),
            opened: false,
            id_regenerated: false,
        }
    }
}
