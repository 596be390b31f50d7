//! Configuration for the Autonomic MAS bridge.
//!
//! A TOML file layered under `AUTONOMIC_*` environment variables, validated
//! and translated to `autonomic_core::BridgeConfig`. The zone list is read
//! once at startup; there is no hot reload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use autonomic_core::{AccessoryDefaults, BridgeConfig, SyncSettings, ZoneIdentity};

/// Prefix for environment overrides; `__` separates nested keys
/// (`AUTONOMIC_SYNC__POLL_INTERVAL=30`).
pub const ENV_PREFIX: &str = "AUTONOMIC_";

/// Controller address the original deployment used; written by `config init`.
pub const EXAMPLE_BASE_URL: &str = "http://Autonomic.redirectme.net:5005/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub accessory: AccessorySection,

    /// Zones to bridge, in the order accessories are published.
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,
}

/// The MAS controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteSection {
    /// API root, e.g. "http://mas.local:5005/api". Zone listing appends
    /// `/api/mrad.browsezones` to this.
    #[serde(default)]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: default_timeout(),
        }
    }
}

/// Poll cadence, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// How long a local write may disagree with polls before remote wins.
    #[serde(default = "default_write_grace")]
    pub write_grace: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            write_grace: default_write_grace(),
        }
    }
}

/// Metadata shown on every zone accessory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessorySection {
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AccessorySection {
    fn default() -> Self {
        Self {
            manufacturer: default_manufacturer(),
            model: default_model(),
        }
    }
}

/// One `[[zones]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneEntry {
    /// Display name; must match the controller's zone `Name` exactly.
    pub name: String,
    pub serial_number: String,
}

fn default_timeout() -> u64 {
    autonomic_core::config::DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    autonomic_core::config::DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_write_grace() -> u64 {
    autonomic_core::config::DEFAULT_WRITE_GRACE.as_secs()
}
fn default_manufacturer() -> String {
    AccessoryDefaults::default().manufacturer
}
fn default_model() -> String {
    AccessoryDefaults::default().model
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "autonomic").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("autonomic");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` layered under the environment.
///
/// A missing file is not an error here; the result simply has no zones
/// and fails [`Config::validate`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Starter config: the two zones of the original deployment.
pub fn example_config() -> Config {
    Config {
        remote: RemoteSection {
            base_url: EXAMPLE_BASE_URL.into(),
            ..RemoteSection::default()
        },
        zones: vec![
            ZoneEntry {
                name: "Loft".into(),
                serial_number: "001".into(),
            },
            ZoneEntry {
                name: "Kitchen".into(),
                serial_number: "002".into(),
            },
        ],
        ..Config::default()
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Render config as TOML.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(cfg)?)?;
    Ok(())
}

// ── Validation and translation ──────────────────────────────────────

impl Config {
    /// Check everything `to_bridge_config` relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if self.remote.timeout == 0 {
            return Err(invalid("remote.timeout", "must be at least 1 second"));
        }
        if self.sync.poll_interval == 0 {
            return Err(invalid("sync.poll_interval", "must be at least 1 second"));
        }
        if self.zones.is_empty() {
            return Err(invalid("zones", "at least one [[zones]] entry is required"));
        }

        let mut seen = HashSet::new();
        for zone in &self.zones {
            if zone.name.trim().is_empty() {
                return Err(invalid("zones.name", "must not be empty"));
            }
            if !seen.insert(zone.name.as_str()) {
                return Err(invalid(
                    "zones.name",
                    format!("'{}' is listed more than once", zone.name),
                ));
            }
        }

        Ok(())
    }

    /// Parsed controller URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        if self.remote.base_url.trim().is_empty() {
            return Err(invalid("remote.base_url", "is required"));
        }
        self.remote
            .base_url
            .parse()
            .map_err(|e| invalid("remote.base_url", format!("{e}: {}", self.remote.base_url)))
    }

    /// Validate and build the runtime configuration.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        self.validate()?;

        Ok(BridgeConfig {
            base_url: self.base_url()?,
            timeout: Duration::from_secs(self.remote.timeout),
            sync: SyncSettings {
                poll_interval: Duration::from_secs(self.sync.poll_interval),
                write_grace: Duration::from_secs(self.sync.write_grace),
            },
            accessory: AccessoryDefaults {
                manufacturer: self.accessory.manufacturer.clone(),
                model: self.accessory.model.clone(),
            },
            zones: self
                .zones
                .iter()
                .map(|z| ZoneIdentity::new(z.name.clone(), z.serial_number.clone()))
                .collect(),
        })
    }
}
