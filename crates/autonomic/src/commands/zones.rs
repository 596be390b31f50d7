//! `autonomic zones`: list the controller's zones.

use tabled::Tabled;

use autonomic_core::{BridgeConfig, ZoneRecord};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Now Playing")]
    now_playing: String,
}

impl From<&ZoneRecord> for ZoneRow {
    fn from(z: &ZoneRecord) -> Self {
        Self {
            name: z.name.clone(),
            power: output::power_label(z.is_on, false),
            source: z.source_name.clone(),
            group: z.group_name.clone(),
            volume: z.volume.map(|v| v.to_string()).unwrap_or_default(),
            now_playing: z
                .source_meta_data
                .as_ref()
                .and_then(|m| m.display_line1.clone())
                .unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(bridge: &BridgeConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let client = bridge
        .client()
        .map_err(|e| CliError::from_sync(e, &bridge.base_url))?;

    let zones = client
        .list_zones()
        .await
        .map_err(|e| CliError::from_sync(e.into(), &bridge.base_url))?;

    let out = output::render_list(&global.output, &zones, |z| ZoneRow::from(z), |z| z.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
