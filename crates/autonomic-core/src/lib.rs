//! Zone power synchronization between accessory surfaces and the MAS controller.
//!
//! Each configured zone gets a [`SyncEngine`] that polls the controller on a
//! fixed interval, reconciles the result in a [`ZoneStateStore`], and pushes
//! remote changes to an [`AccessorySink`]. Accessory toggles arrive through an
//! [`AccessorySource`] and are written through optimistically.
//!
//! ```text
//!  accessory ──IntentSender──▶ SyncEngine ──ZoneClient──▶ controller
//!      ▲                          │   ▲
//!      └────AccessorySink─────────┘   └── ZoneStateStore (reconcile)
//! ```
//!
//! [`BridgeSupervisor`] owns one engine task per zone and stops them all on
//! shutdown.

pub mod accessory;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;
pub mod supervisor;

pub use accessory::{AccessorySink, AccessorySource, IntentSender, PowerIntent, accessory_channel};
pub use config::{AccessoryDefaults, BridgeConfig, SyncSettings};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use model::{
    AccessoryInfo, EnginePhase, Origin, PendingWrite, Transition, ZoneIdentity, ZoneState,
};
pub use store::{ZoneSnapshot, ZoneStateStore, ZoneWatch};
pub use supervisor::{BridgeSupervisor, ZoneBinding, ZoneStatus};

// Re-export the client so binaries need only one dependency.
pub use autonomic_api::{ZoneClient, ZoneRecord};
