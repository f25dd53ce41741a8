//! Anomaly Events
//!
//! The three conditions a validated open can fail on are expected
//! outcomes of normal traffic (first visit, idle timeout, changed
//! client), so they are modeled as events delivered to a single
//! [`EventSink`], not as errors. A sink that does nothing leaves the
//! lifecycle closed, matching the fail-closed posture.

use chrono::{DateTime, Utc};
use sessio_core::SessionId;

/// Anomaly observed while opening a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// No record for the presented id: it never existed, or the store
    /// already expired it. The two cases are indistinguishable by
    /// design.
    NoDataOrExpired { id: SessionId },

    /// The record exists but the session's own TTL has elapsed.
    Expired {
        id: SessionId,
        last_trace: DateTime<Utc>,
    },

    /// The freshly computed client fingerprint does not match the
    /// snapshot stored with the session.
    InvalidFingerprint {
        id: SessionId,
        expected: String,
        actual: String,
    },
}

impl SessionEvent {
    /// The session id the anomaly was observed for.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        match self {
            Self::NoDataOrExpired { id }
            | Self::Expired { id, .. }
            | Self::InvalidFingerprint { id, .. } => id,
        }
    }

    /// Stable name for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoDataOrExpired { .. } => "no_data_or_expired",
            Self::Expired { .. } => "expired",
            Self::InvalidFingerprint { .. } => "invalid_fingerprint",
        }
    }
}

/// Receiver for anomaly events.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &SessionEvent);
}

/// Sink that discards every event. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &SessionEvent) {}
}

/// Sink that logs each anomaly as a structured warning, for audit
/// trails without custom handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &SessionEvent) {
        match event {
            SessionEvent::NoDataOrExpired { id } => {
                tracing::warn!(session_id = %id, kind = event.kind(), "session anomaly");
            }
            SessionEvent::Expired { id, last_trace } => {
                tracing::warn!(
                    session_id = %id,
                    kind = event.kind(),
                    last_trace = %last_trace,
                    "session anomaly"
                );
            }
            SessionEvent::InvalidFingerprint { id, expected, actual } => {
                tracing::warn!(
                    session_id = %id,
                    kind = event.kind(),
                    expected = %expected,
                    actual = %actual,
                    "session anomaly"
                );
            }
        }
    }
}
