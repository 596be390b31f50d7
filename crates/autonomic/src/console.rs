//! Console accessory: stands in for a home-accessory framework.
//!
//! Controller-driven updates are logged; stdin lines `<zone> on|off` are
//! delivered as accessory toggles. Stdin is read on a dedicated OS thread,
//! the way an accessory framework delivers callbacks on its own thread.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, info, warn};

use autonomic_core::{AccessoryInfo, AccessorySink, IntentSender};

const UNKNOWN: u8 = 0;
const OFF: u8 = 1;
const ON: u8 = 2;

/// One zone's console accessory.
#[derive(Debug)]
pub struct ConsoleAccessory {
    info: AccessoryInfo,
    power: AtomicU8,
}

impl ConsoleAccessory {
    pub fn new(info: AccessoryInfo) -> Self {
        Self {
            info,
            power: AtomicU8::new(UNKNOWN),
        }
    }

    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }
}

impl AccessorySink for ConsoleAccessory {
    fn set_power_state(&self, is_on: bool) {
        self.power.store(if is_on { ON } else { OFF }, Ordering::Relaxed);
        info!(
            zone = %self.info.name,
            serial = %self.info.serial_number,
            is_on,
            "accessory power updated"
        );
    }

    fn power_state(&self) -> Option<bool> {
        match self.power.load(Ordering::Relaxed) {
            ON => Some(true),
            OFF => Some(false),
            _ => None,
        }
    }
}

// ── Stdin toggles ───────────────────────────────────────────────────

/// Parse `<zone> on|off`. Zone names may contain spaces.
pub fn parse_toggle(line: &str) -> Result<(&str, bool), String> {
    let line = line.trim();
    let Some((zone, word)) = line.rsplit_once(char::is_whitespace) else {
        return Err(format!("expected '<zone> on|off', got '{line}'"));
    };

    let is_on = match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => true,
        "off" | "0" | "false" => false,
        other => return Err(format!("expected 'on' or 'off', got '{other}'")),
    };

    let zone = zone.trim();
    if zone.is_empty() {
        return Err("missing zone name".into());
    }
    Ok((zone, is_on))
}

/// Deliver one parsed line. Returns an error message for the operator.
pub fn deliver(senders: &HashMap<String, IntentSender>, line: &str) -> Result<(), String> {
    let (zone, is_on) = parse_toggle(line)?;
    let sender = senders
        .get(zone)
        .ok_or_else(|| format!("unknown zone '{zone}'"))?;

    if sender.power_changed(is_on) {
        info!(zone, is_on, "accessory toggled");
        Ok(())
    } else {
        Err(format!("zone '{zone}' is no longer running"))
    }
}

/// Deliver every line of `input` until EOF or a read error.
pub fn read_toggles(input: impl BufRead, senders: &HashMap<String, IntentSender>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = deliver(senders, &line) {
            warn!(error = %e, "ignored console input");
        }
    }
    debug!("console input closed");
}

/// Read toggles from stdin on a detached thread.
///
/// The thread works on its own clones; the caller's senders keep every
/// engine's write path open after stdin closes.
pub fn spawn_stdin_reader(senders: &HashMap<String, IntentSender>) {
    let senders = senders.clone();
    let spawned = std::thread::Builder::new()
        .name("console-accessory".into())
        .spawn(move || read_toggles(std::io::stdin().lock(), &senders));

    if let Err(e) = spawned {
        warn!(error = %e, "console input unavailable");
    }
}
