//! Attribute schema descriptors.
//!
//! Each entity type declares a static table of attribute definitions:
//! name, semantic kind, and mutability class. The descriptor is consulted
//! by validation and by generic payload checks, never mutated at runtime.
//! Declaring schemas as `'static` data keeps them checked at compile time
//! instead of walking struct fields reflectively.

use crate::error::InvalidInput;
use serde_json::Value;

/// Semantic type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// UTF-8 string, including enum-like strings passed through verbatim.
    String,
    /// Signed integer.
    Int,
    /// Boolean flag.
    Bool,
    /// Unordered set of unique strings.
    StringSet,
    /// Unordered set of unique integers (e.g. tag id references).
    IntSet,
    /// Nested attribute mapping with its own required sub-fields.
    Nested,
}

impl AttributeKind {
    /// Whether a JSON value is compatible with this kind.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::StringSet => matches!(value, Value::Array(items) if items.iter().all(Value::is_string)),
            Self::IntSet => {
                matches!(value, Value::Array(items) if items.iter().all(|v| v.is_i64() || v.is_u64()))
            }
            Self::Nested => value.is_object(),
        }
    }

    /// Human-readable kind name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::StringSet => "set of strings",
            Self::IntSet => "set of integers",
            Self::Nested => "nested object",
        }
    }
}

/// Mutability class of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Caller must supply a value.
    Required,
    /// Caller may supply a value.
    Optional,
    /// Populated only from remote state, never supplied by the caller.
    Computed,
    /// Caller may supply a value, otherwise the remote default applies.
    OptionalComputed,
}

impl Mutability {
    /// Whether the caller must supply this attribute.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Whether the attribute is ever sent in a request body.
    ///
    /// Computed attributes only flow remote-to-local.
    #[must_use]
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// Definition of a single attribute within an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDef {
    /// Declarative attribute name (snake_case).
    pub name: &'static str,
    /// Field name in the remote wire representation (camelCase).
    pub wire_name: &'static str,
    /// Semantic type.
    pub kind: AttributeKind,
    /// Mutability class.
    pub mutability: Mutability,
}

impl AttributeDef {
    /// Declare a required attribute.
    #[must_use]
    pub const fn required(
        name: &'static str,
        wire_name: &'static str,
        kind: AttributeKind,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            mutability: Mutability::Required,
        }
    }

    /// Declare an optional attribute.
    #[must_use]
    pub const fn optional(
        name: &'static str,
        wire_name: &'static str,
        kind: AttributeKind,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            mutability: Mutability::Optional,
        }
    }

    /// Declare a computed attribute.
    #[must_use]
    pub const fn computed(
        name: &'static str,
        wire_name: &'static str,
        kind: AttributeKind,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            mutability: Mutability::Computed,
        }
    }

    /// Declare an optional attribute with a remote-side default.
    #[must_use]
    pub const fn optional_computed(
        name: &'static str,
        wire_name: &'static str,
        kind: AttributeKind,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            mutability: Mutability::OptionalComputed,
        }
    }
}

/// Schema descriptor for one entity type.
///
/// Declared as static data alongside each entity mapping.
///
/// # Example
///
/// ```
/// use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
///
/// static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
///     kind: "tag",
///     attributes: &[
///         AttributeDef::computed("id", "id", AttributeKind::Int),
///         AttributeDef::required("label", "label", AttributeKind::String),
///     ],
/// };
///
/// assert!(DESCRIPTOR.attribute("label").is_some());
/// ```
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Entity type name (e.g. "movie").
    pub kind: &'static str,
    /// Ordered attribute definitions.
    pub attributes: &'static [AttributeDef],
}

impl EntityDescriptor {
    /// Look up an attribute definition by declarative name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Iterate over the required attributes.
    pub fn required(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes
            .iter()
            .filter(|a| a.mutability.is_required())
    }

    /// Validate a materialized wire payload against this schema.
    ///
    /// Checks that every required attribute is present and non-null, and
    /// that every known attribute present in the payload is type-compatible
    /// with its declared kind. Fields the schema does not know about are
    /// ignored; the remote service is authoritative on those.
    pub fn check_payload(&self, payload: &Value) -> Result<(), InvalidInput> {
        let Some(object) = payload.as_object() else {
            return Err(InvalidInput::new(format!(
                "{} payload must be a JSON object",
                self.kind
            )));
        };

        for attr in self.required() {
            match object.get(attr.wire_name) {
                None | Some(Value::Null) => {
                    return Err(InvalidInput::missing(self.kind, attr.name));
                }
                Some(_) => {}
            }
        }

        for attr in self.attributes {
            if let Some(value) = object.get(attr.wire_name) {
                if !value.is_null() && !attr.kind.accepts(value) {
                    return Err(InvalidInput::new(format!(
                        "{} attribute {} must be a {}",
                        self.kind,
                        attr.name,
                        attr.kind.name()
                    )));
                }
            }
        }

        Ok(())
    }
}
