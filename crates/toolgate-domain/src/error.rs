//! Domain error type.
//!
//! One variant family per machine-stable code in the tool surface's error
//! contract. The server crate maps each variant to `{code, message,
//! retryable}`; the mapping lives there, not here, so the domain stays
//! transport-agnostic.

use thiserror::Error;

/// Result type alias used throughout the domain and application layers.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Authorization header was empty.
    #[error("missing authorization")]
    MissingAuth,

    /// Authorization header was present but malformed.
    #[error("invalid authorization: {message}")]
    InvalidAuth {
        /// Why the token failed to parse.
        message: String,
    },

    /// No active file or synthesized directory exists at the given path.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// A write or rename target collides with an existing, non-overwritable row.
    #[error("already exists: {path}")]
    AlreadyExists {
        /// Colliding path.
        path: String,
    },

    /// Operation requires a file but the path resolves to a synthesized directory.
    #[error("is a directory: {path}")]
    IsDirectory {
        /// Offending path.
        path: String,
    },

    /// Operation requires a directory (or free segment) but a parent segment is a file.
    #[error("not a directory: {path}")]
    NotDirectory {
        /// Offending path.
        path: String,
    },

    /// Project or path failed §8.2 validation.
    #[error("invalid path: {message}")]
    InvalidPath {
        /// Validation failure detail.
        message: String,
    },

    /// Offset was negative, or out of range for the requested write mode.
    #[error("invalid offset: {message}")]
    InvalidOffset {
        /// Validation failure detail.
        message: String,
    },

    /// Search query was empty or otherwise unusable.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Validation failure detail.
        message: String,
    },

    /// Generic bad-argument error for tool inputs that are not one of the more
    /// specific validation failures above.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Validation failure detail.
        message: String,
    },

    /// Recursive delete was requested `false` but descendants exist.
    #[error("not empty: {path}")]
    NotEmpty {
        /// Offending path.
        path: String,
    },

    /// Operation is disallowed by policy (e.g. un-toggled root wipe).
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Why the operation was denied.
        message: String,
    },

    /// A single payload exceeded `max_payload_bytes`.
    #[error("payload too large: {message}")]
    PayloadTooLarge {
        /// Which cap was exceeded.
        message: String,
    },

    /// A file or project byte cap was exceeded.
    #[error("quota exceeded: {message}")]
    QuotaExceeded {
        /// Which cap was exceeded.
        message: String,
    },

    /// Caller exceeded a rate limit (reserved for transport-layer use).
    #[error("rate limited: {message}")]
    RateLimited {
        /// Detail.
        message: String,
    },

    /// Advisory lock could not be acquired within the configured timeout.
    /// Retryable.
    #[error("resource busy: {message}")]
    ResourceBusy {
        /// Detail.
        message: String,
    },

    /// Both semantic and lexical search backends failed. Retryable.
    #[error("search backend error: {message}")]
    SearchBackendError {
        /// Detail.
        message: String,
    },

    /// Catch-all for storage, serialization, and provider failures that are
    /// not one of the above and are not retryable.
    #[error("internal error: {message}")]
    Internal {
        /// Detail.
        message: String,
        /// Optional wrapped source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider registry lookup failed, or a resolved provider's
    /// constructor rejected its configuration. Surfaces as `INTERNAL_ERROR`:
    /// these are startup/wiring failures, never a caller's fault.
    #[error("configuration error: {message}")]
    Configuration {
        /// Detail.
        message: String,
        /// Optional wrapped source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Returns the machine-stable code string for this error, matching §7.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuth => "MISSING_AUTH",
            Self::InvalidAuth { .. } => "INVALID_AUTH",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::IsDirectory { .. } => "IS_DIRECTORY",
            Self::NotDirectory { .. } => "NOT_DIRECTORY",
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::InvalidOffset { .. } => "INVALID_OFFSET",
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::NotEmpty { .. } => "NOT_EMPTY",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::ResourceBusy { .. } => "RESOURCE_BUSY",
            Self::SearchBackendError { .. } => "SEARCH_BACKEND_ERROR",
            Self::Internal { .. } | Self::Configuration { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may safely retry the operation unmodified.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ResourceBusy { .. } | Self::SearchBackendError { .. })
    }

    /// Builds a [`Error::NotFound`].
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Builds a [`Error::InvalidArgument`].
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Builds a [`Error::InvalidPath`].
    pub fn invalid_path<S: Into<String>>(message: S) -> Self {
        Self::InvalidPath { message: message.into() }
    }

    /// Builds a [`Error::ResourceBusy`].
    pub fn resource_busy<S: Into<String>>(message: S) -> Self {
        Self::ResourceBusy { message: message.into() }
    }

    /// Builds a [`Error::SearchBackendError`].
    pub fn search_backend<S: Into<String>>(message: S) -> Self {
        Self::SearchBackendError { message: message.into() }
    }

    /// Builds a [`Error::Internal`] with no source.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Builds a [`Error::Internal`] wrapping a source error.
    pub fn internal_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal { message: message.into(), source: Some(Box::new(source)) }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::internal_with_source("json error", e)
    }
}
