//! CLI flag overrides on top of `autonomic-config`.
//!
//! Core never sees these types -- it receives a pre-built `BridgeConfig`.

use std::path::PathBuf;

use autonomic_config::{Config, load_config};
use autonomic_core::BridgeConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `AUTONOMIC_CONFIG`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(autonomic_config::config_path)
}

/// Load the config file (if any) and apply `--base-url` / `--timeout`.
pub fn load_with_overrides(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_file(global);
    let mut cfg = load_config(&path)?;

    if let Some(ref url) = global.base_url {
        cfg.remote.base_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.remote.timeout = timeout;
    }

    Ok(cfg)
}

/// Everything `run` needs. The config file must exist, since zones live there.
pub fn bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let path = config_file(global);
    if !path.exists() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }

    Ok(load_with_overrides(global)?.to_bridge_config()?)
}

/// Controller-only config for one-shot commands. Zones are not required,
/// so `--base-url` alone is enough.
pub fn client_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let cfg = load_with_overrides(global)?;

    if cfg.remote.base_url.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_file(global).display().to_string(),
        });
    }
    if cfg.remote.timeout == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut bridge = BridgeConfig::new(cfg.base_url()?, Vec::new());
    bridge.timeout = std::time::Duration::from_secs(cfg.remote.timeout);
    Ok(bridge)
}
