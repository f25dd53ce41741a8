//! Lifecycle Configuration
//!
//! Policy knobs for expiry and id rotation. The session TTL here is
//! independent of any store-level expiry: both are enforced, and
//! whichever fires first wins.

use std::time::Duration;

/// Default session TTL and id rotation interval (24 minutes, the
/// classic idle-timeout default).
pub const DEFAULT_TTL: Duration = Duration::from_secs(1440);

/// Session lifecycle policy.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle expiry: a session whose last trace is older than this is
    /// rejected at open. Must be non-zero.
    pub ttl: Duration,

    /// Rotate the id when the last rotation is older than this.
    /// `None` disables time-based rotation.
    pub id_ttl: Option<Duration>,

    /// Rotate the id once the request count reaches this limit.
    /// `None` disables count-based rotation.
    pub id_requests_limit: Option<u64>,

    /// Recreate the session after an anomaly instead of staying
    /// closed. Off by default: fail-closed is the safer posture for
    /// fixation resistance, so the legacy auto-recreate behavior is an
    /// explicit opt-in.
    pub recreate_on_anomaly: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            id_ttl: Some(DEFAULT_TTL),
            id_requests_limit: None,
            recreate_on_anomaly: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(1440));
        assert_eq!(config.id_ttl, Some(Duration::from_secs(1440)));
        assert_eq!(config.id_requests_limit, None);
        assert!(!config.recreate_on_anomaly);
    }
}
