//! # reelsync
//!
//! Declarative configuration management for Radarr-compatible media
//! managers. An operator declares the desired configuration of a media
//! service (movies, indexers, download clients, notifications, tags) and
//! this crate reconciles each declared entity against the service's REST
//! API: converting declarative models to wire requests, driving the
//! create/read/update/delete/import lifecycle, and converting responses
//! back without losing anything a host needs for future diffing.
//!
//! Deciding *whether* something needs to change is the host's job; this
//! crate only performs conversions and remote calls once told to act.
//!
//! ## Example
//!
//! ```no_run
//! use reelsync::Reelsync;
//! use reelsync::entities::Movie;
//!
//! let sync = Reelsync::connect("http://localhost:7878", "abcdef0123456789");
//!
//! let movie = Movie {
//!     title: "Blue Movie".to_string(),
//!     path: "/config/Blue_Movie_1969".to_string(),
//!     tmdb_id: 242423,
//!     quality_profile_id: 1,
//!     monitored: false,
//!     ..Movie::default()
//! };
//!
//! let created = sync.movies().create(&movie).unwrap();
//! println!("managed movie id {}", created.id.unwrap());
//! ```
//!
//! The engine itself lives in the [`reconcile`] crate and is re-exported
//! here; `entities` holds the per-entity mappings.

pub mod entities;

pub use reconcile::{
    ApiFailure, Controller, EntitySpec, Error, ErrorKind, HttpRemote, InvalidInput, Lookup,
    Operation, Remote, Result, StubRemote,
};

use entities::{
    DownloadClientEntity, IndexerEntity, MovieEntity, NotificationEntity, TagEntity,
};

/// Per-service facade bundling one controller per entity type over a
/// shared connection handle.
///
/// The handle is injected once at construction and cloned into each
/// controller; clones share the underlying connection pool and are safe
/// for concurrent use across different entity instances.
pub struct Reelsync<R: Remote + Clone> {
    remote: R,
}

impl<R: Remote + Clone> Reelsync<R> {
    /// Create a facade over an injected remote handle.
    ///
    /// Use [`Reelsync::connect`] for the common HTTP case; inject a
    /// [`StubRemote`] for tests.
    #[must_use]
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Access the underlying remote handle.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Controller for movies.
    #[must_use]
    pub fn movies(&self) -> Controller<MovieEntity, R> {
        Controller::new(self.remote.clone())
    }

    /// Controller for tags.
    #[must_use]
    pub fn tags(&self) -> Controller<TagEntity, R> {
        Controller::new(self.remote.clone())
    }

    /// Controller for indexers.
    #[must_use]
    pub fn indexers(&self) -> Controller<IndexerEntity, R> {
        Controller::new(self.remote.clone())
    }

    /// Controller for download clients.
    #[must_use]
    pub fn download_clients(&self) -> Controller<DownloadClientEntity, R> {
        Controller::new(self.remote.clone())
    }

    /// Controller for notifications.
    #[must_use]
    pub fn notifications(&self) -> Controller<NotificationEntity, R> {
        Controller::new(self.remote.clone())
    }
}

impl Reelsync<HttpRemote> {
    /// Connect to a remote service by base URL and API key.
    #[must_use]
    pub fn connect(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(HttpRemote::new(base_url, api_key))
    }
}
