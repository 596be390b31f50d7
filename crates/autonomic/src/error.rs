//! CLI error types with miette diagnostics.
//!
//! Maps `SyncError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use autonomic_config::ConfigError;
use autonomic_core::SyncError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const PROTOCOL: i32 = 9;
    pub const CONFIG: i32 = 78;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("Could not reach controller at {url}")]
    #[diagnostic(
        code(autonomic::connection_failed),
        help(
            "Check that the MAS controller is running and reachable.\n\
             Override the address with --base-url, or raise --timeout."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller at {url} answered with an unrecognized zone list")]
    #[diagnostic(
        code(autonomic::protocol),
        help("Neither the nested nor the flat zone envelope matched: {message}")
    )]
    Protocol { url: String, message: String },

    #[error("Zone '{zone}' not found")]
    #[diagnostic(
        code(autonomic::zone_not_found),
        help("Zone names are matched exactly. Run: autonomic zones")
    )]
    ZoneNotFound { zone: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(autonomic::no_config),
        help(
            "Create one with: autonomic config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(autonomic::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(autonomic::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(autonomic::config))]
    Config(ConfigError),

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(autonomic::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(autonomic::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Protocol { .. } => exit_code::PROTOCOL,
            Self::ZoneNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoConfig { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::Internal(_) | Self::Io(_) | Self::Serialize(_) => exit_code::GENERAL,
        }
    }

    /// Attach the controller URL to a core error.
    pub fn from_sync(err: SyncError, url: &url::Url) -> Self {
        match err {
            SyncError::Transport { message, .. } => Self::ConnectionFailed {
                url: url.to_string(),
                reason: message,
            },
            SyncError::Protocol { message } => Self::Protocol {
                url: url.to_string(),
                message,
            },
            SyncError::ZoneNotFound { zone } => Self::ZoneNotFound { zone },
            SyncError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            SyncError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
