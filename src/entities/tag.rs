//! Tag entity mapping.
//!
//! Tags are the flat id/label pairs other entities reference. The remote
//! API has no get-by-label endpoint, so tags use the by-unique-name
//! lookup strategy: a full listing filtered by exact label match.

use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
use reconcile::{EntitySpec, InvalidInput, Lookup, require};
use serde::{Deserialize, Serialize};

/// Declarative model of a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Server-assigned identifier; unset until created.
    pub id: Option<i64>,
    /// Unique label, also the lookup key.
    pub label: String,
}

/// Wire representation of a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "tag",
    attributes: &[
        AttributeDef::computed("id", "id", AttributeKind::Int),
        AttributeDef::required("label", "label", AttributeKind::String),
    ],
};

/// Entity specification for tags.
pub struct TagEntity;

impl EntitySpec for TagEntity {
    const KIND: &'static str = "tag";
    const RESOURCE: &'static str = "tag";
    const LOOKUP: Lookup = Lookup::ByName;
    type Model = Tag;
    type Wire = TagResource;

    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn materialize(model: &Tag) -> Result<TagResource, InvalidInput> {
        if model.label.trim().is_empty() {
            return Err(InvalidInput::new("tag label must not be empty"));
        }
        Ok(TagResource {
            id: model.id,
            label: Some(model.label.clone()),
        })
    }

    fn normalize(wire: TagResource) -> Result<Tag, InvalidInput> {
        Ok(Tag {
            id: wire.id,
            label: require(wire.label, "tag", "label")?,
        })
    }

    fn id(model: &Tag) -> Option<i64> {
        model.id
    }

    fn name(model: &Tag) -> Option<&str> {
        Some(&model.label)
    }
}
