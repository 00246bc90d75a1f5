//! Indexer entity mapping.
//!
//! Indexers are release sources. The `implementation` attribute is an
//! enum-like string the remote validates; it passes through verbatim so
//! an invalid value surfaces as a remote error rather than a local guess.

use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
use reconcile::{EntitySpec, InvalidInput, Lookup, require};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declarative model of an indexer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indexer {
    /// Server-assigned identifier; unset until created.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Implementation selector (e.g. "Newznab", "Torznab").
    pub implementation: String,
    /// Whether RSS sync uses this indexer.
    pub enable_rss: bool,
    /// Whether automatic searches use this indexer.
    pub enable_automatic_search: bool,
    /// Indexer priority (lower is preferred).
    pub priority: i64,
    /// Tag id references.
    pub tags: BTreeSet<i64>,
    /// Computed: download protocol the implementation speaks.
    pub protocol: Option<String>,
}

/// Wire representation of an indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rss: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_automatic_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "indexer",
    attributes: &[
        AttributeDef::computed("id", "id", AttributeKind::Int),
        AttributeDef::required("name", "name", AttributeKind::String),
        AttributeDef::required("implementation", "implementation", AttributeKind::String),
        AttributeDef::required("enable_rss", "enableRss", AttributeKind::Bool),
        AttributeDef::required(
            "enable_automatic_search",
            "enableAutomaticSearch",
            AttributeKind::Bool,
        ),
        AttributeDef::required("priority", "priority", AttributeKind::Int),
        AttributeDef::optional("tags", "tags", AttributeKind::IntSet),
        AttributeDef::computed("protocol", "protocol", AttributeKind::String),
    ],
};

/// Entity specification for indexers.
pub struct IndexerEntity;

impl EntitySpec for IndexerEntity {
    const KIND: &'static str = "indexer";
    const RESOURCE: &'static str = "indexer";
    const LOOKUP: Lookup = Lookup::ById;
    type Model = Indexer;
    type Wire = IndexerResource;

    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn materialize(model: &Indexer) -> Result<IndexerResource, InvalidInput> {
        if model.name.trim().is_empty() {
            return Err(InvalidInput::new("indexer name must not be empty"));
        }
        if model.implementation.trim().is_empty() {
            return Err(InvalidInput::new("indexer implementation must not be empty"));
        }
        Ok(IndexerResource {
            id: model.id,
            name: Some(model.name.clone()),
            implementation: Some(model.implementation.clone()),
            enable_rss: Some(model.enable_rss),
            enable_automatic_search: Some(model.enable_automatic_search),
            priority: Some(model.priority),
            tags: Some(model.tags.iter().copied().collect()),
            protocol: None,
        })
    }

    fn normalize(wire: IndexerResource) -> Result<Indexer, InvalidInput> {
        Ok(Indexer {
            id: wire.id,
            name: require(wire.name, "indexer", "name")?,
            implementation: require(wire.implementation, "indexer", "implementation")?,
            enable_rss: require(wire.enable_rss, "indexer", "enable_rss")?,
            enable_automatic_search: require(
                wire.enable_automatic_search,
                "indexer",
                "enable_automatic_search",
            )?,
            priority: require(wire.priority, "indexer", "priority")?,
            tags: wire.tags.unwrap_or_default().into_iter().collect(),
            protocol: wire.protocol,
        })
    }

    fn id(model: &Indexer) -> Option<i64> {
        model.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Controller, StubRemote};
    use serde_json::json;

    fn newznab() -> Indexer {
        Indexer {
            id: None,
            name: "nzb-mirror".to_string(),
            implementation: "Newznab".to_string(),
            enable_rss: true,
            enable_automatic_search: true,
            priority: 25,
            tags: [7].into_iter().collect(),
            protocol: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let model = newznab();
        let back = IndexerEntity::normalize(IndexerEntity::materialize(&model).unwrap()).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_implementation_passes_through_verbatim() {
        let mut model = newznab();
        // Not a valid implementation; the remote is the one to reject it.
        model.implementation = "NotARealImplementation".to_string();
        let wire = IndexerEntity::materialize(&model).unwrap();
        assert_eq!(wire.implementation.as_deref(), Some("NotARealImplementation"));
    }

    #[test]
    fn test_computed_protocol_refreshed_on_create() {
        let stub = StubRemote::new();
        stub.set_defaults("indexer", json!({"protocol": "usenet"}));
        let controller: Controller<IndexerEntity, _> = Controller::new(stub);
        let created = controller.create(&newznab()).unwrap();
        assert_eq!(created.protocol.as_deref(), Some("usenet"));
        assert_eq!(created.priority, 25);
    }

    #[test]
    fn test_materialize_rejects_blank_implementation() {
        let mut model = newznab();
        model.implementation = String::new();
        assert!(IndexerEntity::materialize(&model).is_err());
    }
}
