//! Download client entity mapping.
//!
//! `priority` is optional-computed: when the caller leaves it unset the
//! attribute is omitted from the request and the remote default applies.

use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
use reconcile::{EntitySpec, InvalidInput, Lookup, require};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declarative model of a download client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadClient {
    /// Server-assigned identifier; unset until created.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Implementation selector (e.g. "Transmission", "Sabnzbd").
    pub implementation: String,
    /// Client host.
    pub host: String,
    /// Client port.
    pub port: i64,
    /// Whether the client is enabled.
    pub enable: bool,
    /// Client priority; remote default applies when unset.
    pub priority: Option<i64>,
    /// Tag id references.
    pub tags: BTreeSet<i64>,
    /// Computed: download protocol the implementation speaks.
    pub protocol: Option<String>,
}

/// Wire representation of a download client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadClientResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "download client",
    attributes: &[
        AttributeDef::computed("id", "id", AttributeKind::Int),
        AttributeDef::required("name", "name", AttributeKind::String),
        AttributeDef::required("implementation", "implementation", AttributeKind::String),
        AttributeDef::required("host", "host", AttributeKind::String),
        AttributeDef::required("port", "port", AttributeKind::Int),
        AttributeDef::required("enable", "enable", AttributeKind::Bool),
        AttributeDef::optional_computed("priority", "priority", AttributeKind::Int),
        AttributeDef::optional("tags", "tags", AttributeKind::IntSet),
        AttributeDef::computed("protocol", "protocol", AttributeKind::String),
    ],
};

/// Entity specification for download clients.
pub struct DownloadClientEntity;

impl EntitySpec for DownloadClientEntity {
    const KIND: &'static str = "download client";
    const RESOURCE: &'static str = "downloadclient";
    const LOOKUP: Lookup = Lookup::ById;
    type Model = DownloadClient;
    type Wire = DownloadClientResource;

    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn materialize(model: &DownloadClient) -> Result<DownloadClientResource, InvalidInput> {
        if model.name.trim().is_empty() {
            return Err(InvalidInput::new("download client name must not be empty"));
        }
        if model.host.trim().is_empty() {
            return Err(InvalidInput::new("download client host must not be empty"));
        }
        Ok(DownloadClientResource {
            id: model.id,
            name: Some(model.name.clone()),
            implementation: Some(model.implementation.clone()),
            host: Some(model.host.clone()),
            port: Some(model.port),
            enable: Some(model.enable),
            priority: model.priority,
            tags: Some(model.tags.iter().copied().collect()),
            protocol: None,
        })
    }

    fn normalize(wire: DownloadClientResource) -> Result<DownloadClient, InvalidInput> {
        Ok(DownloadClient {
            id: wire.id,
            name: require(wire.name, "download client", "name")?,
            implementation: require(wire.implementation, "download client", "implementation")?,
            host: require(wire.host, "download client", "host")?,
            port: require(wire.port, "download client", "port")?,
            enable: require(wire.enable, "download client", "enable")?,
            priority: wire.priority,
            tags: wire.tags.unwrap_or_default().into_iter().collect(),
            protocol: wire.protocol,
        })
    }

    fn id(model: &DownloadClient) -> Option<i64> {
        model.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Controller, StubRemote};
    use serde_json::json;

    fn transmission() -> DownloadClient {
        DownloadClient {
            id: None,
            name: "seedbox".to_string(),
            implementation: "Transmission".to_string(),
            host: "10.0.0.5".to_string(),
            port: 9091,
            enable: true,
            priority: None,
            tags: BTreeSet::new(),
            protocol: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let mut model = transmission();
        model.priority = Some(3);
        let back =
            DownloadClientEntity::normalize(DownloadClientEntity::materialize(&model).unwrap())
                .unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_unset_priority_is_omitted_from_request() {
        let wire = DownloadClientEntity::materialize(&transmission()).unwrap();
        let payload = serde_json::to_value(&wire).unwrap();
        assert!(payload.get("priority").is_none());
    }

    #[test]
    fn test_remote_default_priority_flows_back() {
        let stub = StubRemote::new();
        stub.set_defaults("downloadclient", json!({"priority": 1, "protocol": "torrent"}));
        let controller: Controller<DownloadClientEntity, _> = Controller::new(stub);
        let created = controller.create(&transmission()).unwrap();
        assert_eq!(created.priority, Some(1));
        assert_eq!(created.protocol.as_deref(), Some("torrent"));
    }

    #[test]
    fn test_caller_priority_wins_over_remote_default() {
        let stub = StubRemote::new();
        stub.set_defaults("downloadclient", json!({"priority": 1}));
        let controller: Controller<DownloadClientEntity, _> = Controller::new(stub);
        let mut model = transmission();
        model.priority = Some(9);
        let created = controller.create(&model).unwrap();
        assert_eq!(created.priority, Some(9));
    }

    #[test]
    fn test_materialize_rejects_blank_host() {
        let mut model = transmission();
        model.host = "  ".to_string();
        assert!(DownloadClientEntity::materialize(&model).is_err());
    }
}
