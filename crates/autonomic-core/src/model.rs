// ── Domain model ──
//
// Zone identity, reconciled state, and the transitions the store reports.
// Everything here is plain data; mutation rules live in `store`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

/// Configured identity of one zone. Never mutated after startup.
///
/// `name` doubles as the MAS zone key, matched exactly against `Name`
/// in browse results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ZoneIdentity {
    pub name: String,
    pub serial_number: String,
}

impl ZoneIdentity {
    pub fn new(name: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serial_number: serial_number.into(),
        }
    }
}

/// Where the current power value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Origin {
    /// Confirmed by a poll of the controller.
    Remote,
    /// Set optimistically by an accessory write.
    Local,
    /// Nothing has been observed yet.
    Unknown,
}

/// Last reconciled truth for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneState {
    pub is_on: bool,
    pub observed_at: DateTime<Utc>,
    pub origin: Origin,
}

impl ZoneState {
    /// The placeholder state held before the first successful poll.
    pub fn unknown(at: DateTime<Utc>) -> Self {
        Self {
            is_on: false,
            observed_at: at,
            origin: Origin::Unknown,
        }
    }
}

/// A local write sent to the controller but not yet seen in a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingWrite {
    pub desired_state: bool,
    pub issued_at: DateTime<Utc>,
}

/// Outcome of reconciling one poll result against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    /// Remote matches what we already hold (or a pending write is still
    /// inside its grace window).
    Unchanged,
    /// Remote moved on its own; the accessory must be updated.
    ChangedFromRemote,
    /// Remote now reports the value a local write asked for.
    ConfirmedPendingWrite,
    /// Remote disagrees with a local write past its grace window; remote wins.
    PendingWriteOverridden,
}

impl Transition {
    /// Whether this transition must be pushed to the accessory.
    pub fn notifies_accessory(self) -> bool {
        matches!(self, Self::ChangedFromRemote | Self::PendingWriteOverridden)
    }
}

/// What a zone's engine is currently doing.
///
/// Poll and write paths run concurrently, so this reflects the phase most
/// recently entered by either path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    Polling,
    Reconciling,
    Writing,
}

/// Descriptive metadata handed to the accessory framework for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInfo {
    pub name: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
}
