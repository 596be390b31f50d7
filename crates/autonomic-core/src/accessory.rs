// ── Accessory seam ──
//
// The bridge does not ship a home-accessory protocol stack. Whatever hosts
// a zone's accessory implements `AccessorySink` (state pushed from the
// controller) and feeds user toggles through an `IntentSender`. Intents are
// queued without blocking so a slow controller never stalls the accessory
// framework's callback thread.

use tokio::sync::mpsc;

/// Receives controller-originated power changes for one zone.
pub trait AccessorySink: Send + Sync {
    /// Publish a new power value to the accessory's `On` characteristic.
    ///
    /// Called outside any store lock. Implementations must not block for long.
    fn set_power_state(&self, is_on: bool);

    /// Last value the accessory is showing, if the host tracks it.
    fn power_state(&self) -> Option<bool> {
        None
    }
}

/// A user-initiated power toggle from the accessory surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerIntent {
    pub desired: bool,
}

/// Create the intent queue for one zone.
pub fn accessory_channel() -> (IntentSender, AccessorySource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntentSender { tx }, AccessorySource { rx })
}

/// Accessory-side handle. Cheap to clone, never blocks.
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: mpsc::UnboundedSender<PowerIntent>,
}

impl IntentSender {
    /// Queue a toggle. Returns `false` once the zone's engine has stopped.
    pub fn power_changed(&self, is_on: bool) -> bool {
        self.tx.send(PowerIntent { desired: is_on }).is_ok()
    }
}

/// Engine-side end of the intent queue.
#[derive(Debug)]
pub struct AccessorySource {
    rx: mpsc::UnboundedReceiver<PowerIntent>,
}

impl AccessorySource {
    /// Next queued toggle; `None` when every sender is gone.
    pub async fn recv(&mut self) -> Option<PowerIntent> {
        self.rx.recv().await
    }
}
