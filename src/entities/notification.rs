//! Notification entity mapping.
//!
//! Demonstrates a nested-object attribute: webhook settings are a nested
//! mapping with their own required sub-field (`url`). Materializing a
//! notification whose settings are structurally malformed is a local
//! validation error; nothing is sent to the remote.

use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
use reconcile::{EntitySpec, InvalidInput, Lookup, require};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Nested webhook settings carried by a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Target URL; required within the nested object.
    pub url: String,
    /// HTTP method; remote default applies when unset.
    pub method: Option<String>,
    /// Optional basic-auth username.
    pub username: Option<String>,
}

/// Declarative model of a notification connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    /// Server-assigned identifier; unset until created.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Implementation selector (e.g. "Webhook", "Discord").
    pub implementation: String,
    /// Notify on grab.
    pub on_grab: bool,
    /// Notify on download.
    pub on_download: bool,
    /// Notify on upgrade.
    pub on_upgrade: bool,
    /// Implementation-specific settings.
    pub settings: WebhookSettings,
    /// Tag id references.
    pub tags: BTreeSet<i64>,
}

/// Wire representation of the nested settings object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettingsResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Wire representation of a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_grab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_download: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_upgrade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<WebhookSettingsResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "notification",
    attributes: &[
        AttributeDef::computed("id", "id", AttributeKind::Int),
        AttributeDef::required("name", "name", AttributeKind::String),
        AttributeDef::required("implementation", "implementation", AttributeKind::String),
        AttributeDef::required("on_grab", "onGrab", AttributeKind::Bool),
        AttributeDef::required("on_download", "onDownload", AttributeKind::Bool),
        AttributeDef::required("on_upgrade", "onUpgrade", AttributeKind::Bool),
        AttributeDef::required("settings", "settings", AttributeKind::Nested),
        AttributeDef::optional("tags", "tags", AttributeKind::IntSet),
    ],
};

/// Entity specification for notifications.
pub struct NotificationEntity;

impl EntitySpec for NotificationEntity {
    const KIND: &'static str = "notification";
    const RESOURCE: &'static str = "notification";
    const LOOKUP: Lookup = Lookup::ById;
    type Model = Notification;
    type Wire = NotificationResource;

    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn materialize(model: &Notification) -> Result<NotificationResource, InvalidInput> {
        if model.name.trim().is_empty() {
            return Err(InvalidInput::new("notification name must not be empty"));
        }
        if model.settings.url.trim().is_empty() {
            return Err(InvalidInput::new(
                "notification settings.url is required and must not be empty",
            ));
        }
        Ok(NotificationResource {
            id: model.id,
            name: Some(model.name.clone()),
            implementation: Some(model.implementation.clone()),
            on_grab: Some(model.on_grab),
            on_download: Some(model.on_download),
            on_upgrade: Some(model.on_upgrade),
            settings: Some(WebhookSettingsResource {
                url: Some(model.settings.url.clone()),
                method: model.settings.method.clone(),
                username: model.settings.username.clone(),
            }),
            tags: Some(model.tags.iter().copied().collect()),
        })
    }

    fn normalize(wire: NotificationResource) -> Result<Notification, InvalidInput> {
        let settings = require(wire.settings, "notification", "settings")?;
        Ok(Notification {
            id: wire.id,
            name: require(wire.name, "notification", "name")?,
            implementation: require(wire.implementation, "notification", "implementation")?,
            on_grab: require(wire.on_grab, "notification", "on_grab")?,
            on_download: require(wire.on_download, "notification", "on_download")?,
            on_upgrade: require(wire.on_upgrade, "notification", "on_upgrade")?,
            settings: WebhookSettings {
                url: require(settings.url, "notification", "settings.url")?,
                method: settings.method,
                username: settings.username,
            },
            tags: wire.tags.unwrap_or_default().into_iter().collect(),
        })
    }

    fn id(model: &Notification) -> Option<i64> {
        model.id
    }
}
