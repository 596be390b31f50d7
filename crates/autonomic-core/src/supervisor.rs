// ── Bridge supervisor ──
//
// Owns one engine task per configured zone. Every task gets its own child
// cancellation token and its own `JoinHandle`, so a panic in one zone's
// loop is observed at shutdown without disturbing the others.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::accessory::{AccessorySink, AccessorySource};
use crate::config::BridgeConfig;
use crate::engine::SyncEngine;
use crate::error::SyncError;
use crate::model::{EnginePhase, PendingWrite, ZoneIdentity, ZoneState};

/// Accessory wiring for one configured zone.
pub struct ZoneBinding {
    pub zone: ZoneIdentity,
    pub sink: Arc<dyn AccessorySink>,
    pub source: AccessorySource,
}

/// Point-in-time view of one zone, for logs and status output.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneStatus {
    pub zone: String,
    pub serial_number: String,
    pub state: ZoneState,
    pub pending: Option<PendingWrite>,
    pub phase: EnginePhase,
}

impl ZoneStatus {
    fn of(engine: &SyncEngine) -> Self {
        let snap = engine.snapshot();
        Self {
            zone: engine.zone().name.clone(),
            serial_number: engine.zone().serial_number.clone(),
            state: snap.state,
            pending: snap.pending,
            phase: engine.phase(),
        }
    }
}

/// Running bridge: one engine per zone.
pub struct BridgeSupervisor {
    engines: Vec<SyncEngine>,
    handles: Vec<(String, JoinHandle<()>)>,
    cancel: CancellationToken,
}

impl BridgeSupervisor {
    /// Spawn one engine per binding, in the order given.
    ///
    /// Every binding must name a zone from `config`, each at most once.
    /// Must be called inside a Tokio runtime.
    pub fn start(config: &BridgeConfig, bindings: Vec<ZoneBinding>) -> Result<Self, SyncError> {
        if config.sync.poll_interval.is_zero() {
            return Err(SyncError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }

        let mut seen = HashSet::new();
        for binding in &bindings {
            if config.zone(&binding.zone.name).is_none() {
                return Err(SyncError::Config {
                    message: format!("zone '{}' is not configured", binding.zone.name),
                });
            }
            if !seen.insert(binding.zone.name.as_str()) {
                return Err(SyncError::Config {
                    message: format!("zone '{}' is bound more than once", binding.zone.name),
                });
            }
        }

        // One connection pool, shared by every engine.
        let client = config.client()?;
        let cancel = CancellationToken::new();
        let mut engines = Vec::with_capacity(bindings.len());
        let mut handles = Vec::with_capacity(bindings.len());

        for ZoneBinding { zone, sink, source } in bindings {
            let name = zone.name.clone();
            let engine = SyncEngine::new(zone, client.clone(), sink, &config.sync);
            let task = engine.clone().run(source, cancel.child_token());
            handles.push((name, tokio::spawn(task)));
            engines.push(engine);
        }

        info!(zones = engines.len(), base_url = %config.base_url, "bridge started");

        Ok(Self {
            engines,
            handles,
            cancel,
        })
    }

    pub fn engine(&self, name: &str) -> Option<&SyncEngine> {
        self.engines.iter().find(|e| e.zone().name == name)
    }

    /// Snapshot of every zone, in configuration order.
    pub fn status(&self) -> Vec<ZoneStatus> {
        self.engines.iter().map(ZoneStatus::of).collect()
    }

    /// Stop every engine and wait for in-flight requests to finish.
    ///
    /// Returns the final status of every zone.
    pub async fn shutdown(self) -> Vec<ZoneStatus> {
        let Self {
            engines,
            handles,
            cancel,
        } = self;
        cancel.cancel();

        let (names, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = futures_util::future::join_all(handles).await;

        for (zone, result) in names.iter().zip(results) {
            if let Err(e) = result {
                if e.is_panic() {
                    error!(zone = %zone, "zone engine panicked");
                } else {
                    error!(zone = %zone, error = %e, "zone engine task failed");
                }
            }
        }

        info!("bridge stopped");
        engines.iter().map(ZoneStatus::of).collect()
    }
}
