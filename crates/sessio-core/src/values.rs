//! Namespaced Session Values
//!
//! Session values are grouped by namespace so that independent
//! components can share one session without key collisions. Callers
//! that do not care about namespaces use [`DEFAULT_NAMESPACE`] through
//! the convenience accessors on the session itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Namespace used when the caller does not specify one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Namespaced key-value bundle carried by a session.
///
/// Namespaces are independent: clearing one never affects another.
/// Values are arbitrary JSON, serialized as part of the persisted
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, BTreeMap<String, Value>>);

impl Values {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value under the given namespace and key.
    pub fn set(&mut self, namespace: &str, key: &str, value: Value) {
        self.0
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Gets a value from the given namespace.
    #[must_use]
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.0.get(namespace).and_then(|ns| ns.get(key))
    }

    /// Returns true if the key exists in the given namespace.
    #[must_use]
    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Removes a value, returning it if present.
    ///
    /// An emptied namespace is dropped so the serialized form stays
    /// minimal.
    pub fn remove(&mut self, namespace: &str, key: &str) -> Option<Value> {
        let ns = self.0.get_mut(namespace)?;
        let value = ns.remove(key);
        if ns.is_empty() {
            self.0.remove(namespace);
        }
        value
    }

    /// Gets and removes a value in one step (one-shot accessor).
    pub fn take(&mut self, namespace: &str, key: &str) -> Option<Value> {
        self.remove(namespace, key)
    }

    /// Returns all values of the given namespace, if any.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&BTreeMap<String, Value>> {
        self.0.get(namespace)
    }

    /// Removes an entire namespace.
    pub fn clear_namespace(&mut self, namespace: &str) {
        self.0.remove(namespace);
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns true if no namespace holds any value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
