//! # reconcile
//!
//! Generic engine for reconciling declarative entity models against a
//! REST API. The engine converts a declarative attribute set into the
//! wire representation the remote service expects, converts responses
//! back without losing information needed for future diffing, and drives
//! a uniform create/read/update/delete/import lifecycle per entity type.
//!
//! The engine deliberately does *not* decide whether a resource needs to
//! change — diffing and planning belong to the host. Each operation here
//! performs exactly one conversion plus one remote call.
//!
//! ## Core Concepts
//!
//! - [`EntityDescriptor`]: static attribute schema per entity type
//! - [`EntitySpec`]: materialize/normalize conversion pair plus identity
//!   metadata, implemented once per entity type
//! - [`Controller`]: the generic CRUD lifecycle driver
//! - [`Remote`]: the injected connection handle boundary, with
//!   [`HttpRemote`] for real services and [`StubRemote`] for tests
//! - [`Error`]: fixed failure taxonomy, every message qualified by
//!   operation and entity type
//!
//! ## Example
//!
//! ```
//! use reconcile::remote::{Remote, StubRemote};
//! use serde_json::json;
//!
//! // Entity mappings implement `EntitySpec`; controllers drive them
//! // against any `Remote`. The stub stands in for a live service here.
//! let remote = StubRemote::new();
//! remote.set_defaults("movie", json!({"status": "released"}));
//! let created = remote.create("movie", &json!({"title": "Blue Movie"})).unwrap();
//! assert_eq!(created["status"], "released");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod controller;
pub mod convert;
pub mod error;
pub mod remote;
pub mod schema;

pub use controller::Controller;
pub use convert::{EntitySpec, Lookup, require};
pub use error::{Error, ErrorKind, InvalidInput, Operation, Result};
pub use remote::{ApiFailure, ApiResult, HttpRemote, Remote, StubRemote};
pub use schema::{AttributeDef, AttributeKind, EntityDescriptor, Mutability};
