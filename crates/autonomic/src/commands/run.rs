//! `autonomic run`: the long-lived bridge.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use autonomic_core::{BridgeConfig, BridgeSupervisor, ZoneBinding, accessory_channel};

use crate::cli::RunArgs;
use crate::console::{self, ConsoleAccessory};
use crate::error::CliError;

pub async fn handle(args: RunArgs, bridge: BridgeConfig) -> Result<(), CliError> {
    let mut bindings = Vec::with_capacity(bridge.zones.len());
    let mut senders = HashMap::new();

    for zone in &bridge.zones {
        let accessory = ConsoleAccessory::new(bridge.accessory_info(zone));
        let info = accessory.info();
        info!(
            zone = %info.name,
            serial = %info.serial_number,
            manufacturer = %info.manufacturer,
            model = %info.model,
            "accessory published"
        );

        let (intents, source) = accessory_channel();
        senders.insert(zone.name.clone(), intents);
        bindings.push(ZoneBinding {
            zone: zone.clone(),
            sink: Arc::new(accessory),
            source,
        });
    }

    let supervisor = BridgeSupervisor::start(&bridge, bindings)
        .map_err(|e| CliError::from_sync(e, &bridge.base_url))?;

    // Held until shutdown so every engine keeps its write path, whatever stdin does.
    if !args.no_stdin {
        console::spawn_stdin_reader(&senders);
    }

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping zones");

    let statuses = supervisor.shutdown().await;
    drop(senders);

    for status in statuses {
        info!(
            zone = %status.zone,
            is_on = status.state.is_on,
            origin = %status.state.origin,
            pending = status.pending.is_some(),
            "final zone state"
        );
    }

    Ok(())
}
