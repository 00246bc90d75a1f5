//! Generic CRUD lifecycle controller.
//!
//! One controller implementation drives the create/read/update/delete/
//! import lifecycle for every entity type, parameterized by the entity's
//! [`EntitySpec`] and by an injected [`Remote`] handle. The controller
//! holds no locks and no cache; concurrent use across *different* entity
//! instances is safe, and one host-issued operation maps to exactly one
//! remote call (a by-name read additionally performs the listing call).

use crate::convert::{EntitySpec, Lookup};
use crate::error::{Error, Operation, Result};
use crate::remote::{ApiFailure, Remote};
use serde_json::Value;
use std::marker::PhantomData;

/// Lifecycle driver for one entity type against one remote service.
///
/// # Example
///
/// ```ignore
/// let controller: Controller<MovieEntity, _> = Controller::new(remote.clone());
/// let created = controller.create(&movie)?;
/// assert!(created.id.is_some());
/// ```
pub struct Controller<E: EntitySpec, R: Remote> {
    remote: R,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntitySpec, R: Remote> Controller<E, R> {
    /// Create a controller over an injected remote handle.
    #[must_use]
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            _entity: PhantomData,
        }
    }

    /// Access the underlying remote handle.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Create the entity remotely and return the refreshed model,
    /// now carrying its server-assigned identifier.
    ///
    /// The model must not already carry an identifier; identifiers are
    /// assigned exactly once, at creation.
    pub fn create(&self, model: &E::Model) -> Result<E::Model> {
        let op = Operation::Create;
        if E::id(model).is_some() {
            return Err(Error::validation(
                op,
                E::KIND,
                "model already carries an identifier; create expects an unmanaged model",
            ));
        }
        let payload = Self::payload(op, model)?;
        log::debug!("{op} {}: POST {}", E::KIND, E::RESOURCE);
        let response = self
            .remote
            .create(E::RESOURCE, &payload)
            .map_err(|failure| Error::classify(op, E::KIND, failure))?;
        Self::decode(op, response)
    }

    /// Fetch current remote state for the model.
    ///
    /// Returns `Ok(None)` when the remote entity no longer exists (or a
    /// by-name lookup matches nothing), so the host can treat its local
    /// record as stale instead of erroring. A by-name lookup matching
    /// more than one entry is an [`Error::AmbiguousName`], never an
    /// arbitrary pick.
    pub fn read(&self, model: &E::Model) -> Result<Option<E::Model>> {
        let op = Operation::Read;
        match E::LOOKUP {
            Lookup::ById => {
                let id = E::id(model).ok_or(Error::MissingIdentifier {
                    operation: op,
                    entity: E::KIND,
                })?;
                self.fetch_by_id(op, id)
            }
            Lookup::ByName => {
                let name = E::name(model)
                    .ok_or_else(|| {
                        Error::validation(op, E::KIND, "model has no name to look up")
                    })?
                    .to_string();
                self.fetch_by_name(op, &name)
            }
        }
    }

    /// Replace the remote entity with the full materialized model.
    ///
    /// The remote API expects a complete representation, not a partial
    /// patch; the returned model is normalized from the response and its
    /// identifier never changes.
    pub fn update(&self, model: &E::Model) -> Result<E::Model> {
        let op = Operation::Update;
        let id = E::id(model).ok_or(Error::MissingIdentifier {
            operation: op,
            entity: E::KIND,
        })?;
        let payload = Self::payload(op, model)?;
        log::debug!("{op} {}: PUT {}/{id}", E::KIND, E::RESOURCE);
        let response = self
            .remote
            .update(E::RESOURCE, id, &payload)
            .map_err(|failure| Error::classify(op, E::KIND, failure))?;
        Self::decode(op, response)
    }

    /// Delete the remote entity keyed by the model's identifier.
    ///
    /// Idempotent from the caller's perspective: an already-absent remote
    /// entity is success. Transport and auth failures still surface.
    pub fn delete(&self, model: &E::Model) -> Result<()> {
        let op = Operation::Delete;
        let id = E::id(model).ok_or(Error::MissingIdentifier {
            operation: op,
            entity: E::KIND,
        })?;
        log::debug!("{op} {}: DELETE {}/{id}", E::KIND, E::RESOURCE);
        match self.remote.delete(E::RESOURCE, id) {
            Ok(()) | Err(ApiFailure::NotFound) => Ok(()),
            Err(failure) => Err(Error::classify(op, E::KIND, failure)),
        }
    }

    /// Adopt a pre-existing remote entity from a raw identifier string.
    ///
    /// The identifier is parsed according to the entity's lookup strategy
    /// (integer id, or unique name) and a fresh model is populated from
    /// remote state. Returns `Ok(None)` when nothing matches.
    pub fn import(&self, raw: &str) -> Result<Option<E::Model>> {
        let op = Operation::Import;
        let raw = raw.trim();
        match E::LOOKUP {
            Lookup::ById => {
                let id: i64 = raw.parse().map_err(|_| Error::InvalidIdentifier {
                    operation: op,
                    entity: E::KIND,
                    raw: raw.to_string(),
                })?;
                self.fetch_by_id(op, id)
            }
            Lookup::ByName => {
                if raw.is_empty() {
                    return Err(Error::InvalidIdentifier {
                        operation: op,
                        entity: E::KIND,
                        raw: raw.to_string(),
                    });
                }
                self.fetch_by_name(op, raw)
            }
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Materialize and schema-check a wire payload for a request body.
    fn payload(op: Operation, model: &E::Model) -> Result<Value> {
        let wire =
            E::materialize(model).map_err(|e| Error::validation(op, E::KIND, e))?;
        let payload =
            serde_json::to_value(&wire).map_err(|e| Error::validation(op, E::KIND, e))?;
        E::descriptor()
            .check_payload(&payload)
            .map_err(|e| Error::validation(op, E::KIND, e))?;
        Ok(payload)
    }

    /// Decode and normalize a response body into a model.
    fn decode(op: Operation, response: Value) -> Result<E::Model> {
        let wire: E::Wire = serde_json::from_value(response).map_err(|e| Error::Client {
            operation: op,
            entity: E::KIND,
            status: 200,
            message: format!("undecodable response body: {e}"),
        })?;
        E::normalize(wire).map_err(|e| Error::validation(op, E::KIND, e))
    }

    fn fetch_by_id(&self, op: Operation, id: i64) -> Result<Option<E::Model>> {
        log::debug!("{op} {}: GET {}/{id}", E::KIND, E::RESOURCE);
        match self.remote.get(E::RESOURCE, id) {
            Ok(response) => Self::decode(op, response).map(Some),
            Err(ApiFailure::NotFound) => Ok(None),
            Err(failure) => Err(Error::classify(op, E::KIND, failure)),
        }
    }

    fn fetch_by_name(&self, op: Operation, name: &str) -> Result<Option<E::Model>> {
        log::debug!("{op} {}: GET {} (lookup by name)", E::KIND, E::RESOURCE);
        let listing = self
            .remote
            .list(E::RESOURCE)
            .map_err(|failure| Error::classify(op, E::KIND, failure))?;

        let mut matches = Vec::new();
        for entry in listing {
            let model = Self::decode(op, entry)?;
            if E::name(&model) == Some(name) {
                matches.push(model);
            }
        }

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(Error::AmbiguousName {
                operation: op,
                entity: E::KIND,
                name: name.to_string(),
                matches: count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::require;
    use crate::error::{ErrorKind, InvalidInput};
    use crate::remote::StubRemote;
    use crate::schema::{AttributeDef, AttributeKind, EntityDescriptor};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections::BTreeSet;

    // =========================================================================
    // Test entity: "widget", looked up by id
    // =========================================================================

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Widget {
        id: Option<i64>,
        name: String,
        enabled: bool,
        tags: BTreeSet<i64>,
        mode: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct WidgetResource {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<i64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<String>,
    }

    static WIDGET: EntityDescriptor = EntityDescriptor {
        kind: "widget",
        attributes: &[
            AttributeDef::computed("id", "id", AttributeKind::Int),
            AttributeDef::required("name", "name", AttributeKind::String),
            AttributeDef::required("enabled", "enabled", AttributeKind::Bool),
            AttributeDef::optional("tags", "tags", AttributeKind::IntSet),
            AttributeDef::optional_computed("mode", "mode", AttributeKind::String),
        ],
    };

    struct WidgetEntity;

    impl EntitySpec for WidgetEntity {
        const KIND: &'static str = "widget";
        const RESOURCE: &'static str = "widget";
        const LOOKUP: Lookup = Lookup::ById;
        type Model = Widget;
        type Wire = WidgetResource;

        fn descriptor() -> &'static EntityDescriptor {
            &WIDGET
        }

        fn materialize(model: &Widget) -> std::result::Result<WidgetResource, InvalidInput> {
            if model.name.trim().is_empty() {
                return Err(InvalidInput::new("widget name must not be empty"));
            }
            Ok(WidgetResource {
                id: model.id,
                name: Some(model.name.clone()),
                enabled: Some(model.enabled),
                tags: Some(model.tags.iter().copied().collect()),
                mode: model.mode.clone(),
            })
        }

        fn normalize(wire: WidgetResource) -> std::result::Result<Widget, InvalidInput> {
            Ok(Widget {
                id: wire.id,
                name: require(wire.name, "widget", "name")?,
                enabled: require(wire.enabled, "widget", "enabled")?,
                tags: wire.tags.unwrap_or_default().into_iter().collect(),
                mode: wire.mode,
            })
        }

        fn id(model: &Widget) -> Option<i64> {
            model.id
        }
    }

    // =========================================================================
    // Test entity: "label", looked up by unique name
    // =========================================================================

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Label {
        id: Option<i64>,
        name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct LabelResource {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    }

    static LABEL: EntityDescriptor = EntityDescriptor {
        kind: "label",
        attributes: &[
            AttributeDef::computed("id", "id", AttributeKind::Int),
            AttributeDef::required("name", "name", AttributeKind::String),
        ],
    };

    struct LabelEntity;

    impl EntitySpec for LabelEntity {
        const KIND: &'static str = "label";
        const RESOURCE: &'static str = "label";
        const LOOKUP: Lookup = Lookup::ByName;
        type Model = Label;
        type Wire = LabelResource;

        fn descriptor() -> &'static EntityDescriptor {
            &LABEL
        }

        fn materialize(model: &Label) -> std::result::Result<LabelResource, InvalidInput> {
            Ok(LabelResource {
                id: model.id,
                name: Some(model.name.clone()),
            })
        }

        fn normalize(wire: LabelResource) -> std::result::Result<Label, InvalidInput> {
            Ok(Label {
                id: wire.id,
                name: require(wire.name, "label", "name")?,
            })
        }

        fn id(model: &Label) -> Option<i64> {
            model.id
        }

        fn name(model: &Label) -> Option<&str> {
            Some(&model.name)
        }
    }

    fn widget() -> Widget {
        Widget {
            id: None,
            name: "primary".to_string(),
            enabled: true,
            tags: [2, 1].into_iter().collect(),
            mode: None,
        }
    }

    fn controller(stub: &StubRemote) -> Controller<WidgetEntity, StubRemote> {
        Controller::new(stub.clone())
    }

    fn label_controller(stub: &StubRemote) -> Controller<LabelEntity, StubRemote> {
        Controller::new(stub.clone())
    }

    // =========================================================================
    // Create
    // =========================================================================

    #[test]
    fn test_create_assigns_identifier() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        assert!(created.id.is_some());
        assert_eq!(created.name, "primary");
        assert_eq!(created.tags, [1, 2].into_iter().collect::<BTreeSet<i64>>());
    }

    #[test]
    fn test_create_refreshes_computed_fields() {
        let stub = StubRemote::new();
        stub.set_defaults("widget", json!({"mode": "automatic"}));
        let created = controller(&stub).create(&widget()).unwrap();
        assert_eq!(created.mode.as_deref(), Some("automatic"));
    }

    #[test]
    fn test_create_rejects_preassigned_identifier() {
        let stub = StubRemote::new();
        let mut model = widget();
        model.id = Some(9);
        let err = controller(&stub).create(&model).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Local);
        assert!(stub.is_empty("widget"));
    }

    #[test]
    fn test_create_surfaces_materialize_failure() {
        let stub = StubRemote::new();
        let mut model = widget();
        model.name = "  ".to_string();
        let err = controller(&stub).create(&model).unwrap_err();
        assert!(format!("{err}").contains("create widget"));
        assert!(stub.is_empty("widget"));
    }

    #[test]
    fn test_create_unauthorized_classification() {
        let stub = StubRemote::new();
        stub.fail_unauthorized(true);
        let err = controller(&stub).create(&widget()).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(format!("{err}").starts_with("create widget:"));
    }

    #[test]
    fn test_create_transport_classification() {
        let stub = StubRemote::new();
        stub.fail_transport("connection refused");
        let err = controller(&stub).create(&widget()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(format!("{err}").contains("connection refused"));
    }

    // =========================================================================
    // Read
    // =========================================================================

    #[test]
    fn test_read_by_id_round_trips() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        let read = controller(&stub).read(&created).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_read_missing_identifier_is_local_error() {
        let stub = StubRemote::new();
        let err = controller(&stub).read(&widget()).unwrap_err();
        match err {
            Error::MissingIdentifier { operation, entity } => {
                assert_eq!(operation, Operation::Read);
                assert_eq!(entity, "widget");
            }
            other => panic!("expected MissingIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn test_read_stale_entity_reports_not_found() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        // Entity removed out of band.
        stub.delete("widget", created.id.unwrap()).unwrap();
        assert_eq!(controller(&stub).read(&created).unwrap(), None);
    }

    #[test]
    fn test_read_by_name_exact_match() {
        let stub = StubRemote::new();
        stub.seed("label", json!({"name": "hd"}));
        stub.seed("label", json!({"name": "uhd"}));
        let probe = Label {
            id: None,
            name: "hd".to_string(),
        };
        let found = label_controller(&stub).read(&probe).unwrap().unwrap();
        assert_eq!(found.name, "hd");
        assert!(found.id.is_some());
    }

    #[test]
    fn test_read_by_name_zero_matches_is_not_found() {
        let stub = StubRemote::new();
        stub.seed("label", json!({"name": "hd"}));
        let probe = Label {
            id: None,
            name: "missing".to_string(),
        };
        assert_eq!(label_controller(&stub).read(&probe).unwrap(), None);
    }

    #[test]
    fn test_read_by_name_ambiguous_is_error() {
        let stub = StubRemote::new();
        stub.seed("label", json!({"name": "hd"}));
        stub.seed("label", json!({"name": "hd"}));
        let probe = Label {
            id: None,
            name: "hd".to_string(),
        };
        let err = label_controller(&stub).read(&probe).unwrap_err();
        match err {
            Error::AmbiguousName { matches, name, .. } => {
                assert_eq!(matches, 2);
                assert_eq!(name, "hd");
            }
            other => panic!("expected AmbiguousName, got {other:?}"),
        }
    }

    // =========================================================================
    // Update
    // =========================================================================

    #[test]
    fn test_update_requires_identifier() {
        let stub = StubRemote::new();
        let err = controller(&stub).update(&widget()).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { .. }));
    }

    #[test]
    fn test_update_keeps_identifier_and_submits_full_body() {
        let stub = StubRemote::new();
        let mut created = controller(&stub).create(&widget()).unwrap();
        let id = created.id;
        created.enabled = false;
        let updated = controller(&stub).update(&created).unwrap();
        assert_eq!(updated.id, id);
        assert!(!updated.enabled);
        // Full-replacement semantics: untouched fields travel with the body.
        let stored = stub.record("widget", id.unwrap()).unwrap();
        assert_eq!(stored["name"], "primary");
        assert_eq!(stored["tags"], json!([1, 2]));
    }

    #[test]
    fn test_update_on_deleted_entity_is_client_error() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        stub.delete("widget", created.id.unwrap()).unwrap();
        let err = controller(&stub).update(&created).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[test]
    fn test_delete_then_read_is_not_found() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        controller(&stub).delete(&created).unwrap();
        assert_eq!(controller(&stub).read(&created).unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        controller(&stub).delete(&created).unwrap();
        // Second delete: remote already absent, still success.
        controller(&stub).delete(&created).unwrap();
    }

    #[test]
    fn test_delete_surfaces_auth_failure() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        stub.fail_unauthorized(true);
        let err = controller(&stub).delete(&created).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_delete_requires_identifier() {
        let stub = StubRemote::new();
        let err = controller(&stub).delete(&widget()).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { .. }));
    }

    // =========================================================================
    // Import
    // =========================================================================

    #[test]
    fn test_import_by_id() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        let raw = created.id.unwrap().to_string();
        let imported = controller(&stub).import(&raw).unwrap().unwrap();
        assert_eq!(imported, created);
    }

    #[test]
    fn test_import_trims_whitespace() {
        let stub = StubRemote::new();
        let created = controller(&stub).create(&widget()).unwrap();
        let raw = format!(" {} ", created.id.unwrap());
        assert!(controller(&stub).import(&raw).unwrap().is_some());
    }

    #[test]
    fn test_import_invalid_identifier() {
        let stub = StubRemote::new();
        let err = controller(&stub).import("not-a-number").unwrap_err();
        match err {
            Error::InvalidIdentifier { raw, .. } => assert_eq!(raw, "not-a-number"),
            other => panic!("expected InvalidIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn test_import_unknown_id_is_not_found() {
        let stub = StubRemote::new();
        assert_eq!(controller(&stub).import("424242").unwrap(), None);
    }

    #[test]
    fn test_import_by_name() {
        let stub = StubRemote::new();
        stub.seed("label", json!({"name": "hd"}));
        let imported = label_controller(&stub).import("hd").unwrap().unwrap();
        assert_eq!(imported.name, "hd");
    }

    #[test]
    fn test_import_by_name_rejects_empty() {
        let stub = StubRemote::new();
        let err = label_controller(&stub).import("  ").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    // =========================================================================
    // Conversion properties
    // =========================================================================

    #[test]
    fn test_set_order_independence() {
        let stub = StubRemote::new();
        let mut a = widget();
        a.tags = [3, 1, 2].into_iter().collect();
        let mut b = widget();
        b.tags = [2, 3, 1].into_iter().collect();

        let created_a = controller(&stub).create(&a).unwrap();
        let created_b = controller(&stub).create(&b).unwrap();
        assert_eq!(created_a.tags, created_b.tags);
    }

    #[test]
    fn test_round_trip_preserves_caller_values() {
        let stub = StubRemote::new();
        let mut model = widget();
        model.mode = Some("manual".to_string());
        let created = controller(&stub).create(&model).unwrap();
        assert_eq!(created.name, model.name);
        assert_eq!(created.enabled, model.enabled);
        assert_eq!(created.tags, model.tags);
        assert_eq!(created.mode, model.mode);
    }
}
