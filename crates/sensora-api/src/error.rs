use thiserror::Error;

/// Top-level error type for the `sensora-api` crate.
///
/// Covers every failure mode: authentication, transport, request-status
/// validation, snapshot lookups, and the attribute checks that run before
/// mutating calls.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API key cannot be used (e.g. not a valid header value).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Requests ────────────────────────────────────────────────────
    /// The backend answered with a status other than the one the
    /// operation expects (GET/PATCH expect 200, POST expects 201).
    #[error("Failed to {operation} (HTTP {status})")]
    RequestFailed { operation: String, status: u16 },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Lookups ─────────────────────────────────────────────────────
    /// No entity in the snapshot matched an exact-name or pattern lookup.
    #[error("No {entity} found matching {query:?}")]
    NotFound { entity: &'static str, query: String },

    /// An id and a name were both supplied but identify different entities.
    #[error("{entity} id {id:?} and name {name:?} do not match")]
    IdentifierMismatch {
        entity: &'static str,
        id: String,
        name: String,
    },

    /// A name pattern failed to compile.
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // ── Attribute validation ────────────────────────────────────────
    /// Attribute keys outside the entity's allow-list. Lists every
    /// offending key, not just the first.
    #[error("Invalid attributes: {names:?}")]
    InvalidAttribute { names: Vec<String> },

    /// A visibility flag held a value that is neither boolean nor string.
    #[error("Value for {name} must be a boolean or a boolean string")]
    InvalidAttributeType { name: String },

    /// A visibility flag held a string outside true/1/false/0.
    #[error("Invalid boolean string value for {name}: {value:?}")]
    InvalidAttributeValue { name: String, value: String },

    /// None of the three visibility flags is true.
    #[error("No visibilities defined as true")]
    NoVisibilitySet,

    /// More than one visibility flag is true. Lists every true flag.
    #[error("Multiple visibilities defined as true: {names:?}")]
    ConflictingVisibility { names: Vec<String> },

    /// Required attributes for the classified visibility are absent.
    /// Lists every missing name.
    #[error("Missing required attributes: {names:?}")]
    MissingRequiredAttributes { names: Vec<String> },
}

impl Error {
    /// Returns `true` if this is a "not found" failure -- either a
    /// snapshot lookup miss or a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::RequestFailed { status: 404, .. }
        )
    }

    /// Returns `true` if this failure was produced by attribute
    /// validation, before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAttribute { .. }
                | Self::InvalidAttributeType { .. }
                | Self::InvalidAttributeValue { .. }
                | Self::NoVisibilitySet
                | Self::ConflictingVisibility { .. }
                | Self::MissingRequiredAttributes { .. }
        )
    }
}
