// ── Runtime bridge configuration ──
//
// Describes *what* to bridge and *how often*. Core never reads config
// files: the binary builds a `BridgeConfig` (via `autonomic-config`) and
// hands it to the supervisor.

use std::time::Duration;

use autonomic_api::{TransportConfig, ZoneClient};
use url::Url;

use crate::error::SyncError;
use crate::model::{AccessoryInfo, ZoneIdentity};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_WRITE_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-zone engine cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Time between polls. The first poll runs immediately.
    pub poll_interval: Duration,
    /// How long a pending local write may disagree with polls before the
    /// remote value is treated as an override.
    pub write_grace: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            write_grace: DEFAULT_WRITE_GRACE,
        }
    }
}

/// Accessory metadata shared by every zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryDefaults {
    pub manufacturer: String,
    pub model: String,
}

impl Default for AccessoryDefaults {
    fn default() -> Self {
        Self {
            manufacturer: "Autonomic".into(),
            model: "MAS".into(),
        }
    }
}

/// Everything the supervisor needs to run the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// MAS controller root (e.g. `http://mas.local:5005`).
    pub base_url: Url,
    /// Per-request timeout for polls and writes.
    pub timeout: Duration,
    pub sync: SyncSettings,
    pub accessory: AccessoryDefaults,
    /// Zones in configuration order.
    pub zones: Vec<ZoneIdentity>,
}

impl BridgeConfig {
    /// Config with default cadence, timeout and accessory metadata.
    pub fn new(base_url: Url, zones: Vec<ZoneIdentity>) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            sync: SyncSettings::default(),
            accessory: AccessoryDefaults::default(),
            zones,
        }
    }

    /// Transport settings for the shared HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }

    /// Build the MAS client every engine shares.
    pub fn client(&self) -> Result<ZoneClient, SyncError> {
        Ok(ZoneClient::new(self.base_url.clone(), &self.transport())?)
    }

    /// Look up a configured zone by display name.
    pub fn zone(&self, name: &str) -> Option<&ZoneIdentity> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Accessory metadata for one zone.
    pub fn accessory_info(&self, zone: &ZoneIdentity) -> AccessoryInfo {
        AccessoryInfo {
            name: zone.name.clone(),
            serial_number: zone.serial_number.clone(),
            manufacturer: self.accessory.manufacturer.clone(),
            model: self.accessory.model.clone(),
        }
    }
}
