// ── Per-zone state store ──
//
// Last-known power state for one zone plus the optional pending local
// write. `reconcile` and `begin_local_write` are the only mutators and run
// inside the watch channel's write lock, so a poll result and an accessory
// toggle can never interleave halfway.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;

use crate::model::{Origin, PendingWrite, Transition, ZoneState};

/// State and pending write, published together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSnapshot {
    pub state: ZoneState,
    pub pending: Option<PendingWrite>,
}

/// Authoritative in-process state for one zone.
///
/// Reads never block writers for longer than a struct copy. Every applied
/// mutation is published to [`ZoneWatch`] subscribers.
#[derive(Debug)]
pub struct ZoneStateStore {
    tx: watch::Sender<ZoneSnapshot>,
    grace: TimeDelta,
}

impl ZoneStateStore {
    /// New store in the `Unknown` state, stamped `at`.
    pub fn new(write_grace: Duration, at: DateTime<Utc>) -> Self {
        let (tx, _) = watch::channel(ZoneSnapshot {
            state: ZoneState::unknown(at),
            pending: None,
        });
        Self {
            tx,
            grace: TimeDelta::from_std(write_grace).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Last reconciled state.
    pub fn current(&self) -> ZoneState {
        self.tx.borrow().state
    }

    /// The local write awaiting confirmation, if any.
    pub fn pending(&self) -> Option<PendingWrite> {
        self.tx.borrow().pending
    }

    /// State and pending write read atomically.
    pub fn snapshot(&self) -> ZoneSnapshot {
        *self.tx.borrow()
    }

    /// Subscribe to snapshot changes.
    pub fn watch(&self) -> ZoneWatch {
        ZoneWatch::new(self.tx.subscribe())
    }

    /// Apply a polled remote value.
    ///
    /// - no pending write: `ChangedFromRemote` when the value differs (or
    ///   nothing was known yet), otherwise `Unchanged`
    /// - pending write, same value: `ConfirmedPendingWrite`, pending cleared
    /// - pending write, different value, observed before the write was
    ///   issued or inside the grace window: `Unchanged`, nothing mutated
    /// - pending write, different value, observed past the grace window:
    ///   `PendingWriteOverridden`, remote value adopted
    ///
    /// `at` is when the remote value was captured, i.e. when the poll
    /// started, not when its response arrived. `observed_at` never moves
    /// backwards: an `at` older than the current stamp is clamped to it.
    pub fn reconcile(&self, new_is_on: bool, at: DateTime<Utc>) -> Transition {
        let grace = self.grace;
        let mut transition = Transition::Unchanged;

        self.tx.send_if_modified(|snap| {
            let captured_at = at;
            let at = at.max(snap.state.observed_at);

            transition = match snap.pending {
                Some(pending) if pending.desired_state == new_is_on => {
                    Transition::ConfirmedPendingWrite
                }
                // Captured before the write existed; says nothing about it.
                Some(pending) if captured_at < pending.issued_at => return false,
                Some(pending) if at.signed_duration_since(pending.issued_at) < grace => {
                    return false;
                }
                Some(_) => Transition::PendingWriteOverridden,
                None if snap.state.origin == Origin::Unknown
                    || snap.state.is_on != new_is_on =>
                {
                    Transition::ChangedFromRemote
                }
                None => Transition::Unchanged,
            };

            snap.pending = None;
            snap.state = ZoneState {
                is_on: new_is_on,
                observed_at: at,
                origin: Origin::Remote,
            };
            true
        });

        transition
    }

    /// Record an accessory-originated write and adopt its value optimistically.
    ///
    /// Replaces any earlier pending write; at most one exists per zone.
    pub fn begin_local_write(&self, desired_state: bool, at: DateTime<Utc>) {
        self.tx.send_modify(|snap| {
            let at = at.max(snap.state.observed_at);
            snap.state = ZoneState {
                is_on: desired_state,
                observed_at: at,
                origin: Origin::Local,
            };
            snap.pending = Some(PendingWrite {
                desired_state,
                issued_at: at,
            });
        });
    }
}

// ── Subscription ────────────────────────────────────────────────────

/// A subscription to one zone's snapshots.
pub struct ZoneWatch {
    current: ZoneSnapshot,
    receiver: watch::Receiver<ZoneSnapshot>,
}

impl ZoneWatch {
    fn new(receiver: watch::Receiver<ZoneSnapshot>) -> Self {
        let current = *receiver.borrow();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &ZoneSnapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since the last `changed()`).
    pub fn latest(&self) -> ZoneSnapshot {
        *self.receiver.borrow()
    }

    /// Wait for the next applied mutation.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<ZoneSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = *self.receiver.borrow_and_update();
        self.current = snap;
        Some(snap)
    }
}
