//! Movie entity mapping.
//!
//! The central managed entity: a movie under library management,
//! referenced by its TMDB id and a quality profile. `status`, `year` and
//! `original_title` are computed server-side and only ever flow
//! remote-to-local.

use reconcile::schema::{AttributeDef, AttributeKind, EntityDescriptor};
use reconcile::{EntitySpec, InvalidInput, Lookup, require};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declarative model of a managed movie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movie {
    /// Server-assigned identifier; unset until created.
    pub id: Option<i64>,
    /// Movie title.
    pub title: String,
    /// Library path on the remote host.
    pub path: String,
    /// TMDB id; the external identity of the movie.
    pub tmdb_id: i64,
    /// Weak reference to the quality profile applied to this movie.
    pub quality_profile_id: i64,
    /// Whether the movie is monitored for downloads.
    pub monitored: bool,
    /// Availability gate (e.g. "announced", "released"); the remote is
    /// authoritative on valid values and applies its default when unset.
    pub minimum_availability: Option<String>,
    /// Tag id references.
    pub tags: BTreeSet<i64>,
    /// Computed: release status reported by the remote.
    pub status: Option<String>,
    /// Computed: release year.
    pub year: Option<i64>,
    /// Computed: original title.
    pub original_title: Option<String>,
}

/// Wire representation of a movie in the remote v3 API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "movie",
    attributes: &[
        AttributeDef::computed("id", "id", AttributeKind::Int),
        AttributeDef::required("title", "title", AttributeKind::String),
        AttributeDef::required("path", "path", AttributeKind::String),
        AttributeDef::required("tmdb_id", "tmdbId", AttributeKind::Int),
        AttributeDef::required("quality_profile_id", "qualityProfileId", AttributeKind::Int),
        AttributeDef::required("monitored", "monitored", AttributeKind::Bool),
        AttributeDef::optional_computed(
            "minimum_availability",
            "minimumAvailability",
            AttributeKind::String,
        ),
        AttributeDef::optional("tags", "tags", AttributeKind::IntSet),
        AttributeDef::computed("status", "status", AttributeKind::String),
        AttributeDef::computed("year", "year", AttributeKind::Int),
        AttributeDef::computed("original_title", "originalTitle", AttributeKind::String),
    ],
};

/// Entity specification for movies.
pub struct MovieEntity;

impl EntitySpec for MovieEntity {
    const KIND: &'static str = "movie";
    const RESOURCE: &'static str = "movie";
    const LOOKUP: Lookup = Lookup::ById;
    type Model = Movie;
    type Wire = MovieResource;

    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn materialize(model: &Movie) -> Result<MovieResource, InvalidInput> {
        if model.title.trim().is_empty() {
            return Err(InvalidInput::new("movie title must not be empty"));
        }
        if model.path.trim().is_empty() {
            return Err(InvalidInput::new("movie path must not be empty"));
        }
        Ok(MovieResource {
            id: model.id,
            title: Some(model.title.clone()),
            path: Some(model.path.clone()),
            tmdb_id: Some(model.tmdb_id),
            quality_profile_id: Some(model.quality_profile_id),
            monitored: Some(model.monitored),
            minimum_availability: model.minimum_availability.clone(),
            tags: Some(model.tags.iter().copied().collect()),
            // Computed fields never travel in requests.
            status: None,
            year: None,
            original_title: None,
        })
    }

    fn normalize(wire: MovieResource) -> Result<Movie, InvalidInput> {
        Ok(Movie {
            id: wire.id,
            title: require(wire.title, "movie", "title")?,
            path: require(wire.path, "movie", "path")?,
            tmdb_id: require(wire.tmdb_id, "movie", "tmdb_id")?,
            quality_profile_id: require(wire.quality_profile_id, "movie", "quality_profile_id")?,
            monitored: require(wire.monitored, "movie", "monitored")?,
            minimum_availability: wire.minimum_availability,
            tags: wire.tags.unwrap_or_default().into_iter().collect(),
            status: wire.status,
            year: wire.year,
            original_title: wire.original_title,
        })
    }

    fn id(model: &Movie) -> Option<i64> {
        model.id
    }
}
