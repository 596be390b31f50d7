// ── Per-zone sync engine ──
//
// One engine owns one zone: a poll loop on a fixed interval, an intent loop
// fed by the accessory, and a writer loop that sends power commands in the
// order the accessory issued them. All three share the zone's store; the
// store's critical section is the only synchronization between them.

use std::sync::Arc;
use std::time::Duration;

use autonomic_api::{ZoneClient, ZoneRecord, models::zone_power};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accessory::{AccessorySink, AccessorySource};
use crate::config::SyncSettings;
use crate::error::SyncError;
use crate::model::{EnginePhase, Transition, ZoneIdentity, ZoneState};
use crate::store::{ZoneSnapshot, ZoneStateStore, ZoneWatch};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Drives one zone. Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    zone: ZoneIdentity,
    client: ZoneClient,
    store: ZoneStateStore,
    sink: Arc<dyn AccessorySink>,
    phase: watch::Sender<EnginePhase>,
    poll_interval: Duration,
    write_tx: mpsc::UnboundedSender<bool>,
    /// Taken by the first `run()`; a second run has nothing to drain.
    write_rx: Mutex<Option<mpsc::UnboundedReceiver<bool>>>,
}

impl SyncEngine {
    pub fn new(
        zone: ZoneIdentity,
        client: ZoneClient,
        sink: Arc<dyn AccessorySink>,
        settings: &SyncSettings,
    ) -> Self {
        let (phase, _) = watch::channel(EnginePhase::Idle);
        let (write_tx, write_rx) = mpsc::unbounded_channel();

        Self {
            inner: Arc::new(EngineInner {
                zone,
                client,
                store: ZoneStateStore::new(settings.write_grace, Utc::now()),
                sink,
                phase,
                poll_interval: settings.poll_interval.max(MIN_POLL_INTERVAL),
                write_tx,
                write_rx: Mutex::new(Some(write_rx)),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn zone(&self) -> &ZoneIdentity {
        &self.inner.zone
    }

    /// Shorthand for `store().current()`.
    pub fn state(&self) -> ZoneState {
        self.inner.store.current()
    }

    pub fn snapshot(&self) -> ZoneSnapshot {
        self.inner.store.snapshot()
    }

    /// Subscribe to this zone's state changes.
    pub fn watch(&self) -> ZoneWatch {
        self.inner.store.watch()
    }

    /// Most recently entered phase.
    pub fn phase(&self) -> EnginePhase {
        *self.inner.phase.borrow()
    }

    fn enter(&self, phase: EnginePhase) {
        self.inner.phase.send_replace(phase);
    }

    // ── Poll path ────────────────────────────────────────────────────

    /// Fetch the zone list once and reconcile this zone against it.
    ///
    /// On failure nothing is mutated and the accessory is not touched.
    /// The result is stamped with the time the request went out, so a slow
    /// response cannot override a toggle made while it was in flight.
    pub async fn poll_once(&self) -> Result<Transition, SyncError> {
        self.enter(EnginePhase::Polling);
        let started = Utc::now();
        let result = match self.inner.client.list_zones().await {
            Ok(records) => {
                self.enter(EnginePhase::Reconciling);
                self.reconcile_records(&records, started)
            }
            Err(e) => Err(e.into()),
        };
        self.enter(EnginePhase::Idle);
        result
    }

    /// Reconcile a zone list that has already been fetched.
    ///
    /// Pushes to the accessory only for `ChangedFromRemote` and
    /// `PendingWriteOverridden`. A zone missing from `records` is
    /// `ZoneNotFound` and leaves the store as it was.
    pub fn apply_poll(&self, records: &[ZoneRecord]) -> Result<Transition, SyncError> {
        self.reconcile_records(records, Utc::now())
    }

    fn reconcile_records(
        &self,
        records: &[ZoneRecord],
        captured_at: DateTime<Utc>,
    ) -> Result<Transition, SyncError> {
        let zone = self.inner.zone.name.as_str();
        let Some(is_on) = zone_power(records, zone) else {
            return Err(SyncError::ZoneNotFound { zone: zone.to_owned() });
        };

        let transition = self.inner.store.reconcile(is_on, captured_at);

        match transition {
            Transition::ChangedFromRemote => {
                info!(zone, is_on, %transition, "zone power changed on controller");
            }
            Transition::PendingWriteOverridden => {
                warn!(zone, is_on, %transition, "controller overrode pending local write");
            }
            Transition::ConfirmedPendingWrite => {
                debug!(zone, is_on, %transition, "controller confirmed local write");
            }
            Transition::Unchanged => {
                debug!(zone, is_on, %transition, "poll reconciled");
            }
        }

        // Store lock is released; the sink may take its time.
        if transition.notifies_accessory() {
            self.inner.sink.set_power_state(is_on);
        }

        Ok(transition)
    }

    // ── Write path ───────────────────────────────────────────────────

    /// Handle an accessory toggle without waiting on the network.
    ///
    /// The store adopts `desired` immediately and the command is queued for
    /// the writer loop. Returns `false` if the engine can no longer send.
    pub fn submit_local_write(&self, desired: bool) -> bool {
        self.inner.store.begin_local_write(desired, Utc::now());
        debug!(zone = %self.inner.zone.name, is_on = desired, "local write queued");
        self.inner.write_tx.send(desired).is_ok()
    }

    /// Send one power command and wait for the controller to accept it.
    ///
    /// Does not touch the store; callers record the pending write first.
    pub async fn write_through(&self, desired: bool) -> Result<(), SyncError> {
        self.enter(EnginePhase::Writing);
        let result = self
            .inner
            .client
            .set_zone_state(&self.inner.zone.name, desired)
            .await
            .map_err(SyncError::from);
        self.enter(EnginePhase::Idle);
        result
    }

    // ── Loops ────────────────────────────────────────────────────────

    /// Run until `cancel` fires.
    ///
    /// The first poll runs immediately. In-flight requests finish (or time
    /// out) before this returns, and writes already queued are still sent.
    pub async fn run(self, mut intents: AccessorySource, cancel: CancellationToken) {
        let Some(mut writes) = self.inner.write_rx.lock().await.take() else {
            warn!(zone = %self.inner.zone.name, "engine already running");
            return;
        };

        info!(
            zone = %self.inner.zone.name,
            interval_secs = self.inner.poll_interval.as_secs(),
            "zone engine started"
        );

        tokio::join!(
            self.poll_loop(&cancel),
            self.intent_loop(&mut intents, &cancel),
            self.write_loop(&mut writes, &cancel),
        );

        self.enter(EnginePhase::Idle);
        info!(zone = %self.inner.zone.name, "zone engine stopped");
    }

    async fn poll_loop(&self, cancel: &CancellationToken) {
        let mut interval = tokio::time::interval(self.inner.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(
                            zone = %self.inner.zone.name,
                            error = %e,
                            "poll failed; retrying next tick"
                        );
                    }
                }
            }
        }
    }

    async fn intent_loop(&self, intents: &mut AccessorySource, cancel: &CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        self.submit_local_write(intent.desired);
                    }
                    None => {
                        debug!(zone = %self.inner.zone.name, "accessory source closed");
                        break;
                    }
                }
            }
        }
    }

    async fn write_loop(
        &self,
        writes: &mut mpsc::UnboundedReceiver<bool>,
        cancel: &CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                desired = writes.recv() => match desired {
                    Some(desired) => self.send_write(desired).await,
                    None => break,
                }
            }
        }

        // Intents already accepted are still delivered.
        while let Ok(desired) = writes.try_recv() {
            self.send_write(desired).await;
        }
    }

    async fn send_write(&self, desired: bool) {
        let zone = self.inner.zone.name.as_str();
        match self.write_through(desired).await {
            Ok(()) => info!(zone, is_on = desired, "power command sent"),
            // Optimistic state stands; the next poll corrects it.
            Err(e) => warn!(zone, is_on = desired, error = %e, "power command failed"),
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("zone", &self.inner.zone)
            .field("state", &self.inner.store.current())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
