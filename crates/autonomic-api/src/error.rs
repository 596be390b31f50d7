use thiserror::Error;

/// Top-level error type for the `autonomic-api` crate.
///
/// Covers every failure mode of the MAS REST surface: transport,
/// non-success HTTP status, unrecognized response bodies, and zone lookup.
/// `autonomic-core` folds these into its three-way sync taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The controller answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The base URL cannot have path segments appended (e.g. `mailto:`).
    #[error("Base URL cannot carry an API path: {0}")]
    CannotBeABase(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response body matched none of the known zone-list envelopes.
    #[error("Unrecognized zone list response: {message}")]
    Protocol { message: String, body: String },

    /// The zone list was fetched, but the requested zone is absent.
    #[error("Zone not found: {name}")]
    ZoneNotFound { name: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns `true` if the zone (or endpoint) does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ZoneNotFound { .. } => true,
            Self::HttpStatus { status, .. } => *status == 404,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if the controller answered but the body was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}
