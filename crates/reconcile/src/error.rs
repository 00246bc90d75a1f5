//! Error types for reconciliation operations.
//!
//! Every failure is qualified by the operation being performed and the
//! entity type it was performed on, so a host can render diagnostics
//! without extra bookkeeping. Remote failures are classified into a fixed
//! taxonomy (unauthorized / client / transport); local validation failures
//! are kept distinct so hosts can tell "bad input" from "remote said no".

use crate::remote::ApiFailure;
use std::fmt;
use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The lifecycle operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Creating a new remote entity.
    Create,
    /// Fetching current remote state.
    Read,
    /// Replacing an existing remote entity.
    Update,
    /// Removing a remote entity.
    Delete,
    /// Adopting a pre-existing remote entity by raw identifier.
    Import,
}

impl Operation {
    /// Lowercase name used in error messages and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Broad classification of an [`Error`].
///
/// Hosts usually only care about this level: whether the failure was an
/// authentication problem, an authoritative remote rejection, a transport
/// problem worth retrying at their discretion, or bad local input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote rejected our credentials.
    Unauthorized,
    /// The remote made an authoritative decision against the request.
    Client,
    /// The call never completed; no remote decision was made.
    Transport,
    /// The input (or lookup) was invalid before any remote call succeeded.
    Local,
}

impl ErrorKind {
    /// Whether this failure came from the remote service rather than
    /// local validation.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

/// A local validation failure raised by the conversion layer.
///
/// Produced when input is structurally malformed (for example a nested
/// object missing a required sub-field) or when a remote response omits a
/// required attribute. Carried into [`Error::Validation`] by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidInput(String);

impl InvalidInput {
    /// Create a validation failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Report an attribute that is required but missing.
    pub fn missing(entity: &str, attribute: &str) -> Self {
        Self(format!("{entity} is missing required attribute {attribute}"))
    }
}

/// Errors that can occur while reconciling an entity.
///
/// Each variant carries the failing operation and the entity-type name so
/// that the rendered message reads like `create movie: ...`.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote rejected the API key.
    #[error("{operation} {entity}: unauthorized (remote rejected the API key)")]
    Unauthorized {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
    },

    /// The remote made an authoritative decision against the request.
    #[error("{operation} {entity}: remote error (HTTP {status}): {message}")]
    Client {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
        /// HTTP status code returned by the remote.
        status: u16,
        /// Remote-supplied detail, verbatim where available.
        message: String,
    },

    /// The remote call could not complete (network, timeout, cancellation).
    #[error("{operation} {entity}: transport failure: {message}")]
    Transport {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
        /// Description of the transport failure.
        message: String,
    },

    /// The input was structurally invalid before any remote call.
    #[error("{operation} {entity}: invalid input: {message}")]
    Validation {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
        /// What was wrong with the input.
        message: String,
    },

    /// A lookup by unique name matched more than one remote entity.
    #[error("{operation} {entity}: name {name:?} matched {matches} entries, expected exactly one")]
    AmbiguousName {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
        /// Name that was looked up.
        name: String,
        /// Number of entries that matched.
        matches: usize,
    },

    /// The operation requires an identifier the model does not carry yet.
    #[error("{operation} {entity}: model has no identifier assigned")]
    MissingIdentifier {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
    },

    /// An externally supplied identifier string could not be parsed.
    #[error("{operation} {entity}: invalid identifier {raw:?}")]
    InvalidIdentifier {
        /// Operation that failed.
        operation: Operation,
        /// Entity type name.
        entity: &'static str,
        /// The raw identifier as supplied.
        raw: String,
    },
}

impl Error {
    /// Classify a transport-level failure into the error taxonomy,
    /// attaching operation and entity context.
    #[must_use]
    pub fn classify(operation: Operation, entity: &'static str, failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Unauthorized => Self::Unauthorized { operation, entity },
            ApiFailure::NotFound => Self::Client {
                operation,
                entity,
                status: 404,
                message: "not found".to_string(),
            },
            ApiFailure::Status { code, message } => Self::Client {
                operation,
                entity,
                status: code,
                message,
            },
            ApiFailure::Transport(message) => Self::Transport {
                operation,
                entity,
                message,
            },
        }
    }

    /// Create a validation error from a message or an [`InvalidInput`].
    pub fn validation(
        operation: Operation,
        entity: &'static str,
        message: impl fmt::Display,
    ) -> Self {
        Self::Validation {
            operation,
            entity,
            message: message.to_string(),
        }
    }

    /// Get the broad classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Client { .. } => ErrorKind::Client,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Validation { .. }
            | Error::AmbiguousName { .. }
            | Error::MissingIdentifier { .. }
            | Error::InvalidIdentifier { .. } => ErrorKind::Local,
        }
    }

    /// Whether the connection handle itself was rejected.
    ///
    /// Hosts can use this to short-circuit further operations against the
    /// same connection instead of failing entity by entity.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// The operation this error occurred in.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Error::Unauthorized { operation, .. }
            | Error::Client { operation, .. }
            | Error::Transport { operation, .. }
            | Error::Validation { operation, .. }
            | Error::AmbiguousName { operation, .. }
            | Error::MissingIdentifier { operation, .. }
            | Error::InvalidIdentifier { operation, .. } => *operation,
        }
    }

    /// The entity-type name this error occurred on.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        match self {
            Error::Unauthorized { entity, .. }
            | Error::Client { entity, .. }
            | Error::Transport { entity, .. }
            | Error::Validation { entity, .. }
            | Error::AmbiguousName { entity, .. }
            | Error::MissingIdentifier { entity, .. }
            | Error::InvalidIdentifier { entity, .. } => entity,
        }
    }
}
