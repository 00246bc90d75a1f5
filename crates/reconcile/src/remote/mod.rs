//! Remote transport abstraction.
//!
//! The [`Remote`] trait is the seam between the generic CRUD controller
//! and the remote service: one REST call per method, JSON bodies, no
//! retries and no caching. The primary implementation is
//! [`http::HttpRemote`]; [`StubRemote`] is an in-memory implementation
//! for tests and offline use.
//!
//! # Testing
//!
//! ```
//! use reconcile::remote::{Remote, StubRemote};
//! use serde_json::json;
//!
//! let stub = StubRemote::new();
//! let created = stub.create("tag", &json!({"label": "hd"})).unwrap();
//! assert_eq!(created["id"], 1);
//! assert_eq!(stub.list("tag").unwrap().len(), 1);
//! ```

pub mod http;

pub use http::HttpRemote;

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Result type for transport-level calls.
pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// Unclassified outcome of a failed remote call.
///
/// The controller attaches operation and entity context and turns this
/// into a reportable [`Error`](crate::Error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    /// Credentials were rejected (HTTP 401/403).
    #[error("unauthorized")]
    Unauthorized,

    /// The addressed entity does not exist (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Any other authoritative rejection by the remote service.
    #[error("HTTP {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Remote-supplied detail, verbatim where available.
        message: String,
    },

    /// The call never completed; no remote decision was made.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One REST call per method against a single remote service.
///
/// Implementations must be safe for concurrent use by multiple in-flight
/// operations: stateless request issuance, no shared mutable buffers.
pub trait Remote: Send + Sync {
    /// List all entities of a resource.
    fn list(&self, resource: &str) -> ApiResult<Vec<Value>>;

    /// Fetch one entity by server-assigned id.
    fn get(&self, resource: &str, id: i64) -> ApiResult<Value>;

    /// Create an entity; the response carries the assigned id.
    fn create(&self, resource: &str, body: &Value) -> ApiResult<Value>;

    /// Replace an entity (full representation) keyed by id.
    fn update(&self, resource: &str, id: i64, body: &Value) -> ApiResult<Value>;

    /// Delete an entity keyed by id.
    fn delete(&self, resource: &str, id: i64) -> ApiResult<()>;
}

#[derive(Debug, Default)]
struct StubState {
    records: HashMap<String, BTreeMap<i64, Value>>,
    defaults: HashMap<String, Value>,
    next_id: i64,
    unauthorized: bool,
    transport_failure: Option<String>,
}

impl StubState {
    fn check_failures(&self) -> ApiResult<()> {
        if let Some(message) = &self.transport_failure {
            return Err(ApiFailure::Transport(message.clone()));
        }
        if self.unauthorized {
            return Err(ApiFailure::Unauthorized);
        }
        Ok(())
    }

    /// Merge server-side defaults into a record, simulating fields the
    /// remote computes on create/update.
    fn apply_defaults(&self, resource: &str, record: &mut Value) {
        let Some(defaults) = self.defaults.get(resource).and_then(Value::as_object) else {
            return;
        };
        let Some(object) = record.as_object_mut() else {
            return;
        };
        for (key, value) in defaults {
            let missing = match object.get(key) {
                None | Some(Value::Null) => true,
                Some(_) => false,
            };
            if missing {
                object.insert(key.clone(), value.clone());
            }
        }
    }
}

/// In-memory remote for testing without network access.
///
/// Clones share one store, so a controller under test and the assertions
/// inspecting stored records can hold separate handles. Server-assigned
/// ids start at 1 and increase monotonically across all resources.
#[derive(Debug, Clone, Default)]
pub struct StubRemote {
    inner: Arc<Mutex<StubState>>,
}

impl StubRemote {
    /// Create a new empty stub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure server-side default fields for a resource.
    ///
    /// The given JSON object is merged into every created or updated
    /// record for fields the request left absent, simulating computed
    /// fields like a movie's `status` or `year`.
    pub fn set_defaults(&self, resource: impl Into<String>, defaults: Value) {
        let mut state = self.inner.lock().unwrap();
        state.defaults.insert(resource.into(), defaults);
    }

    /// Seed a pre-existing record, returning its assigned id.
    pub fn seed(&self, resource: impl Into<String>, mut record: Value) -> i64 {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        if let Some(object) = record.as_object_mut() {
            object.insert("id".to_string(), Value::from(id));
        }
        state
            .records
            .entry(resource.into())
            .or_default()
            .insert(id, record);
        id
    }

    /// Make every subsequent call fail with [`ApiFailure::Unauthorized`].
    pub fn fail_unauthorized(&self, on: bool) {
        self.inner.lock().unwrap().unauthorized = on;
    }

    /// Make every subsequent call fail with [`ApiFailure::Transport`].
    pub fn fail_transport(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().transport_failure = Some(message.into());
    }

    /// Clear injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.inner.lock().unwrap();
        state.unauthorized = false;
        state.transport_failure = None;
    }

    /// Inspect the stored record for an id, if any.
    #[must_use]
    pub fn record(&self, resource: &str, id: i64) -> Option<Value> {
        let state = self.inner.lock().unwrap();
        state.records.get(resource).and_then(|r| r.get(&id)).cloned()
    }

    /// Number of stored records for a resource.
    #[must_use]
    pub fn len(&self, resource: &str) -> usize {
        let state = self.inner.lock().unwrap();
        state.records.get(resource).map_or(0, BTreeMap::len)
    }

    /// Whether a resource has no stored records.
    #[must_use]
    pub fn is_empty(&self, resource: &str) -> bool {
        self.len(resource) == 0
    }
}

impl Remote for StubRemote {
    fn list(&self, resource: &str) -> ApiResult<Vec<Value>> {
        let state = self.inner.lock().unwrap();
        state.check_failures()?;
        Ok(state
            .records
            .get(resource)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get(&self, resource: &str, id: i64) -> ApiResult<Value> {
        let state = self.inner.lock().unwrap();
        state.check_failures()?;
        state
            .records
            .get(resource)
            .and_then(|records| records.get(&id))
            .cloned()
            .ok_or(ApiFailure::NotFound)
    }

    fn create(&self, resource: &str, body: &Value) -> ApiResult<Value> {
        let mut state = self.inner.lock().unwrap();
        state.check_failures()?;
        if !body.is_object() {
            return Err(ApiFailure::Status {
                code: 400,
                message: "request body must be a JSON object".to_string(),
            });
        }

        state.next_id += 1;
        let id = state.next_id;
        let mut record = body.clone();
        if let Some(object) = record.as_object_mut() {
            object.insert("id".to_string(), Value::from(id));
        }
        state.apply_defaults(resource, &mut record);
        state
            .records
            .entry(resource.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, resource: &str, id: i64, body: &Value) -> ApiResult<Value> {
        let mut state = self.inner.lock().unwrap();
        state.check_failures()?;
        let exists = state
            .records
            .get(resource)
            .is_some_and(|records| records.contains_key(&id));
        if !exists {
            return Err(ApiFailure::NotFound);
        }

        let mut record = body.clone();
        if let Some(object) = record.as_object_mut() {
            object.insert("id".to_string(), Value::from(id));
        }
        state.apply_defaults(resource, &mut record);
        state
            .records
            .entry(resource.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    fn delete(&self, resource: &str, id: i64) -> ApiResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.check_failures()?;
        let removed = state
            .records
            .get_mut(resource)
            .and_then(|records| records.remove(&id));
        match removed {
            Some(_) => Ok(()),
            None => Err(ApiFailure::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stub_create_assigns_ids() {
        let stub = StubRemote::new();
        let first = stub.create("tag", &json!({"label": "hd"})).unwrap();
        let second = stub.create("tag", &json!({"label": "uhd"})).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(stub.len("tag"), 2);
    }

    #[test]
    fn test_stub_get_and_not_found() {
        let stub = StubRemote::new();
        let id = stub.seed("tag", json!({"label": "hd"}));
        assert_eq!(stub.get("tag", id).unwrap()["label"], "hd");
        assert_eq!(stub.get("tag", 999).unwrap_err(), ApiFailure::NotFound);
    }

    #[test]
    fn test_stub_update_replaces_record() {
        let stub = StubRemote::new();
        let id = stub.seed("movie", json!({"title": "Old", "monitored": false}));
        let updated = stub
            .update("movie", id, &json!({"title": "Old", "monitored": true}))
            .unwrap();
        assert_eq!(updated["monitored"], true);
        assert_eq!(updated["id"], id);
        assert_eq!(stub.record("movie", id).unwrap()["monitored"], true);
    }

    #[test]
    fn test_stub_update_missing_is_not_found() {
        let stub = StubRemote::new();
        let result = stub.update("movie", 7, &json!({"title": "x"}));
        assert_eq!(result.unwrap_err(), ApiFailure::NotFound);
    }

    #[test]
    fn test_stub_delete() {
        let stub = StubRemote::new();
        let id = stub.seed("tag", json!({"label": "hd"}));
        assert!(stub.delete("tag", id).is_ok());
        assert!(stub.is_empty("tag"));
        assert_eq!(stub.delete("tag", id).unwrap_err(), ApiFailure::NotFound);
    }

    #[test]
    fn test_stub_defaults_fill_absent_fields() {
        let stub = StubRemote::new();
        stub.set_defaults("movie", json!({"status": "released", "year": 1969}));
        let created = stub
            .create("movie", &json!({"title": "Blue Movie", "year": 1970}))
            .unwrap();
        // Caller-supplied fields win; only absent ones are defaulted.
        assert_eq!(created["year"], 1970);
        assert_eq!(created["status"], "released");
    }

    #[test]
    fn test_stub_failure_injection() {
        let stub = StubRemote::new();
        stub.fail_unauthorized(true);
        assert_eq!(stub.list("tag").unwrap_err(), ApiFailure::Unauthorized);

        stub.clear_failures();
        stub.fail_transport("connection reset");
        match stub.list("tag").unwrap_err() {
            ApiFailure::Transport(message) => assert_eq!(message, "connection reset"),
            other => panic!("expected transport failure, got {other:?}"),
        }

        stub.clear_failures();
        assert!(stub.list("tag").is_ok());
    }

    #[test]
    fn test_stub_clones_share_state() {
        let stub = StubRemote::new();
        let handle = stub.clone();
        stub.seed("tag", json!({"label": "hd"}));
        assert_eq!(handle.len("tag"), 1);
    }
}
