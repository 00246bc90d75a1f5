//! Conversion layer between declarative models and remote wire models.
//!
//! Every managed entity type implements [`EntitySpec`]: a pair of pure
//! functions (`materialize` / `normalize`) plus identity metadata. The
//! generic [`Controller`](crate::Controller) is written once against this
//! trait instead of duplicating the lifecycle per entity.
//!
//! The two conversions must be exact inverses for every attribute the
//! remote echoes back unchanged: a model round-tripped through
//! `materialize` and `normalize` reproduces all caller-supplied values
//! while computed attributes are refreshed from the response.

use crate::error::InvalidInput;
use crate::schema::EntityDescriptor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// How an existing remote entity is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Server-assigned integer id.
    ById,
    /// Unique name, matched exactly against a full listing.
    ByName,
}

/// Contract implemented once per managed entity type.
///
/// Implementations hold no state; all methods are pure. Structurally
/// malformed input (e.g. a nested object missing a required sub-field)
/// is reported as [`InvalidInput`], never silently coerced.
pub trait EntitySpec {
    /// Entity type name used in error messages and logs (e.g. "movie").
    const KIND: &'static str;

    /// Resource path segment in the remote API (e.g. "downloadclient").
    const RESOURCE: &'static str;

    /// Identifier strategy for reads and imports.
    const LOOKUP: Lookup;

    /// Declarative model: the caller-facing attribute set.
    type Model: Clone + fmt::Debug;

    /// Wire model: the remote service's JSON representation.
    type Wire: Serialize + DeserializeOwned;

    /// The attribute schema for this entity type.
    fn descriptor() -> &'static EntityDescriptor;

    /// Convert a declarative model into the wire request representation.
    ///
    /// Computed attributes are never materialized; absent optional
    /// attributes are omitted from the request rather than defaulted.
    fn materialize(model: &Self::Model) -> Result<Self::Wire, InvalidInput>;

    /// Convert a wire response back into the declarative model.
    ///
    /// Every field present in the response overwrites the corresponding
    /// model attribute, computed fields included. Fields absent from the
    /// response leave the attribute unset rather than zero-valued.
    fn normalize(wire: Self::Wire) -> Result<Self::Model, InvalidInput>;

    /// Server-assigned identifier, if the entity has been created.
    fn id(model: &Self::Model) -> Option<i64>;

    /// Unique name used for [`Lookup::ByName`] entities.
    ///
    /// The default returns `None`; by-name entities must override this.
    fn name(_model: &Self::Model) -> Option<&str> {
        None
    }
}

/// Unwrap a response field that the remote is required to populate.
///
/// Shared by `normalize` implementations for attributes that are part of
/// the caller-supplied contract and therefore must be echoed back.
pub fn require<T>(value: Option<T>, entity: &str, attribute: &str) -> Result<T, InvalidInput> {
    value.ok_or_else(|| {
        InvalidInput::new(format!(
            "{entity} response is missing required attribute {attribute}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present() {
        assert_eq!(require(Some(5), "movie", "tmdb_id").unwrap(), 5);
    }

    #[test]
    fn test_require_absent() {
        let err = require::<i64>(None, "movie", "tmdb_id").unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("movie"));
        assert!(message.contains("tmdb_id"));
    }
}
