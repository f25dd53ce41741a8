//! End-to-end lifecycle tests driving a session against an in-memory
//! store, covering create/open/close/destroy, the anomaly check order,
//! id rotation, and store-failure behavior.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use sessio_core::{SessionId, SessionMetadata, SessionRecord, Values, DEFAULT_NAMESPACE};
use sessio_id::MemoryCarrier;
use sessio_session::{
    EventSink, FingerprintSource, Session, SessionConfig, SessionEvent, UserSession,
};
use sessio_store::{MemoryStore, Store, StoreError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sink capturing every delivered event for assertions.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Store whose every operation fails.
struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn save(
        &self,
        _id: &SessionId,
        _record: &SessionRecord,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend {
            cause: "backend down".to_string(),
        })
    }

    async fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Backend {
            cause: "backend down".to_string(),
        })
    }

    async fn delete(&self, _id: &SessionId) -> Result<(), StoreError> {
        Err(StoreError::Backend {
            cause: "backend down".to_string(),
        })
    }
}

struct StaticFingerprint(&'static str);

impl FingerprintSource for StaticFingerprint {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

fn fresh_session(store: Arc<dyn Store>) -> Session {
    Session::builder(store)
        .carrier(Box::new(MemoryCarrier::new()))
        .build()
}

fn returning_session(store: Arc<dyn Store>, id: &str) -> Session {
    Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id(id)))
        .build()
}

/// Seeds a record directly into the store, bypassing the lifecycle, so
/// tests control the stored metadata exactly.
async fn seed_record(
    store: &MemoryStore,
    id: &str,
    metadata: SessionMetadata,
    values: Values,
) {
    let record = SessionRecord { values, metadata };
    store
        .save(&SessionId::new(id), &record, Duration::from_secs(100_000))
        .await
        .unwrap();
}

fn fresh_metadata() -> SessionMetadata {
    let now = Utc::now();
    SessionMetadata {
        first_trace: now,
        last_trace: now,
        regeneration_trace: now,
        requests_count: 1,
        fingerprint: String::new(),
    }
}

#[tokio::test]
async fn test_create_yields_opened_session_with_distinct_ids() {
    let store = Arc::new(MemoryStore::new());
    let mut first = fresh_session(store.clone());
    let mut second = fresh_session(store);

    first.create().unwrap();
    second.create().unwrap();

    assert!(first.is_opened());
    assert_eq!(first.requests_count(), 1);
    assert!(first.first_trace().is_some());
    assert_ne!(first.id().unwrap(), second.id().unwrap());
}

#[tokio::test]
async fn test_open_without_id_stays_closed_unless_asked_to_create() {
    let store = Arc::new(MemoryStore::new());

    let mut passive = fresh_session(store.clone());
    assert!(!passive.open(false).await.unwrap());
    assert!(!passive.is_opened());
    assert!(passive.id().is_none());

    let mut eager = fresh_session(store);
    assert!(eager.open(true).await.unwrap());
    assert!(eager.is_opened());
    assert!(eager.id().is_some());
}

#[tokio::test]
async fn test_open_is_idempotent_while_open() {
    let store = Arc::new(MemoryStore::new());
    let mut session = fresh_session(store);
    session.create().unwrap();

    assert!(session.open(false).await.unwrap());
    assert_eq!(session.requests_count(), 1);
}

#[tokio::test]
async fn test_values_survive_close_and_reopen() {
    let store = Arc::new(MemoryStore::new());

    let mut session = fresh_session(store.clone());
    session.create().unwrap();
    session.set_value("theme", json!("dark"));
    session.set_value_in("cart", "items", json!([1, 2, 3]));
    let id = session.id().unwrap();
    session.close().await.unwrap();
    assert!(!session.is_opened());

    let mut returning = returning_session(store, id.as_str());
    assert!(returning.open(false).await.unwrap());
    assert_eq!(returning.value("theme"), Some(&json!("dark")));
    assert_eq!(returning.value_in("cart", "items"), Some(&json!([1, 2, 3])));
    assert_eq!(returning.requests_count(), 2);
}

#[tokio::test]
async fn test_unknown_id_raises_no_data_or_expired() {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());

    let mut session = Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id("abc123")))
        .event_sink(sink.clone())
        .build();

    assert!(!session.open(false).await.unwrap());
    assert!(!session.is_opened());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SessionEvent::NoDataOrExpired { id } if id.as_str() == "abc123"
    ));
}

#[tokio::test]
async fn test_stale_last_trace_raises_expired() {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());

    let mut metadata = fresh_metadata();
    metadata.last_trace = Utc::now() - ChronoDuration::seconds(10_000);
    seed_record(&store, "stale", metadata, Values::new()).await;

    let mut session = Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id("stale")))
        .event_sink(sink.clone())
        .build();

    assert!(!session.open(false).await.unwrap());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], SessionEvent::Expired { .. }));
}

#[tokio::test]
async fn test_fingerprint_mismatch_raises_invalid_fingerprint() {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());

    let mut metadata = fresh_metadata();
    metadata.fingerprint = "f1".to_string();
    seed_record(&store, "printed", metadata, Values::new()).await;

    let mut session = Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id("printed")))
        .event_sink(sink.clone())
        .fingerprint_source(Box::new(StaticFingerprint("f2")))
        .build();

    assert!(!session.open(false).await.unwrap());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SessionEvent::InvalidFingerprint { expected, actual, .. }
            if expected == "f1" && actual == "f2"
    ));
}

#[tokio::test]
async fn test_matching_fingerprint_opens() {
    let store = Arc::new(MemoryStore::new());

    let mut metadata = fresh_metadata();
    metadata.fingerprint = "f1".to_string();
    seed_record(&store, "printed", metadata, Values::new()).await;

    let mut session = Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id("printed")))
        .fingerprint_source(Box::new(StaticFingerprint("f1")))
        .build();

    assert!(session.open(false).await.unwrap());
}

#[tokio::test]
async fn test_empty_fingerprint_engine_is_a_noop_check() {
    let store = Arc::new(MemoryStore::new());

    // Record written with no fingerprint sources configured.
    seed_record(&store, "plain", fresh_metadata(), Values::new()).await;

    let mut session = returning_session(store, "plain");
    assert!(session.open(false).await.unwrap());
}

#[tokio::test]
async fn test_recreate_on_anomaly_opt_in() {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());

    let mut session = Session::builder(store)
        .carrier(Box::new(MemoryCarrier::with_id("ghost")))
        .event_sink(sink.clone())
        .config(SessionConfig {
            recreate_on_anomaly: true,
            ..SessionConfig::default()
        })
        .build();

    assert!(session.open(false).await.unwrap());
    assert!(session.is_opened());
    assert_ne!(session.id().unwrap().as_str(), "ghost");
    // The anomaly is still reported even when recreating.
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn test_requests_limit_rotates_id_at_close() {
    let store = Arc::new(MemoryStore::new());

    let mut session = Session::builder(store.clone())
        .carrier(Box::new(MemoryCarrier::new()))
        .config(SessionConfig {
            id_requests_limit: Some(1),
            id_ttl: None,
            ..SessionConfig::default()
        })
        .build();

    session.create().unwrap();
    let old_id = session.id().unwrap();
    session.close().await.unwrap();

    let new_id = session.id().unwrap();
    assert_ne!(new_id, old_id);
    assert!(store.fetch(&old_id).await.unwrap().is_none());
    assert!(store.fetch(&new_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_id_rotates_at_most_once_per_span() {
    let store = Arc::new(MemoryStore::new());
    let mut session = fresh_session(store);
    session.create().unwrap();

    assert!(session.regenerate_id().await.unwrap());
    let rotated_id = session.id().unwrap();

    assert!(!session.regenerate_id().await.unwrap());
    assert_eq!(session.id().unwrap(), rotated_id);
}

#[tokio::test]
async fn test_destroy_clears_store_and_carrier() {
    let store = Arc::new(MemoryStore::new());
    let mut session = fresh_session(store.clone());

    session.create().unwrap();
    session.set_value("theme", json!("dark"));
    let id = session.id().unwrap();
    session.close().await.unwrap();
    assert!(store.fetch(&id).await.unwrap().is_some());

    let mut returning = returning_session(store.clone(), id.as_str());
    assert!(returning.open(false).await.unwrap());
    returning.destroy().await.unwrap();

    assert!(!returning.is_opened());
    assert!(returning.id().is_none());
    assert!(returning.value("theme").is_none());
    assert!(store.fetch(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_on_failing_store_reports_error_but_closes() {
    let mut session = Session::builder(Arc::new(FailingStore))
        .carrier(Box::new(MemoryCarrier::new()))
        .build();

    session.create().unwrap();
    session.set_value("theme", json!("dark"));

    let result = session.close().await;
    assert!(result.is_err());
    assert!(!session.is_opened());
    assert!(session.value("theme").is_none());
}

#[tokio::test]
async fn test_fetch_failure_is_treated_as_no_data() {
    let sink = Arc::new(RecordingSink::default());
    let mut session = Session::builder(Arc::new(FailingStore))
        .carrier(Box::new(MemoryCarrier::with_id("abc")))
        .event_sink(sink.clone())
        .build();

    assert!(!session.open(false).await.unwrap());
    assert!(matches!(
        &sink.events()[0],
        SessionEvent::NoDataOrExpired { .. }
    ));
}

#[tokio::test]
async fn test_logged_in_marker_survives_close_and_reopen() {
    let store = Arc::new(MemoryStore::new());

    let mut session = UserSession::new(fresh_session(store.clone()));
    session.create().unwrap();
    session.login("alice").await.unwrap();
    let id = session.inner().id().unwrap();
    session.close().await.unwrap();

    let mut returning = UserSession::new(returning_session(store, id.as_str()));
    assert!(returning.open(false).await.unwrap());
    assert!(returning.is_logged());
    assert_eq!(returning.user_id(), Some(&json!("alice")));

    returning.logout();
    assert!(!returning.is_logged());
}

#[tokio::test]
async fn test_default_namespace_is_shared_with_namespaced_accessors() {
    let store = Arc::new(MemoryStore::new());
    let mut session = fresh_session(store);
    session.create().unwrap();

    session.set_value("key", json!(1));
    assert_eq!(session.value_in(DEFAULT_NAMESPACE, "key"), Some(&json!(1)));
}
