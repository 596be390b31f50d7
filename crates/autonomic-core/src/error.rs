// ── Core error types ──
//
// The sync engine sees three recoverable failure kinds: transport,
// protocol, and zone-not-found. The `From<autonomic_api::Error>` impl
// folds transport-layer detail into those; configuration problems are
// the only non-recoverable class.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum SyncError {
    // ── Recoverable (retried on the next tick) ───────────────────────
    #[error("Cannot reach controller: {message}")]
    Transport {
        message: String,
        /// HTTP status, when the controller answered with a non-2xx.
        status: Option<u16>,
    },

    #[error("Unrecognized controller response: {message}")]
    Protocol { message: String },

    #[error("Zone not found in controller response: {zone}")]
    ZoneNotFound { zone: String },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Errors the engine swallows and retries on the next poll tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Protocol { .. } | Self::ZoneNotFound { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<autonomic_api::Error> for SyncError {
    fn from(err: autonomic_api::Error) -> Self {
        match err {
            autonomic_api::Error::Transport(ref e) => SyncError::Transport {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            autonomic_api::Error::Timeout { timeout_secs } => SyncError::Transport {
                message: format!("request timed out after {timeout_secs}s"),
                status: None,
            },
            autonomic_api::Error::HttpStatus { status, url } => SyncError::Transport {
                message: format!("HTTP {status} from {url}"),
                status: Some(status),
            },
            autonomic_api::Error::Protocol { message, body: _ } => SyncError::Protocol { message },
            autonomic_api::Error::ZoneNotFound { name } => SyncError::ZoneNotFound { zone: name },
            autonomic_api::Error::CannotBeABase(url) => SyncError::Config {
                message: format!("base URL cannot carry an API path: {url}"),
            },
            autonomic_api::Error::ClientBuild(message) => SyncError::Internal(message),
        }
    }
}
