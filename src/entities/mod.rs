//! Entity mappings for the managed remote service.
//!
//! Each module pairs a declarative model with its wire representation and
//! implements [`EntitySpec`](reconcile::EntitySpec) for it. Adding support
//! for a new entity type means adding one module here; the lifecycle
//! controller is generic and needs no changes.

pub mod download_client;
pub mod indexer;
pub mod movie;
pub mod notification;
pub mod tag;

pub use download_client::{DownloadClient, DownloadClientEntity, DownloadClientResource};
pub use indexer::{Indexer, IndexerEntity, IndexerResource};
pub use movie::{Movie, MovieEntity, MovieResource};
pub use notification::{
    Notification, NotificationEntity, NotificationResource, WebhookSettings,
    WebhookSettingsResource,
};
pub use tag::{Tag, TagEntity, TagResource};
