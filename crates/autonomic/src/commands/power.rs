//! `autonomic get` / `autonomic set`: one-shot power reads and writes.

use serde::Serialize;

use autonomic_core::BridgeConfig;

use crate::cli::{GlobalOpts, PowerArg};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ZonePower<'a> {
    zone: &'a str,
    is_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

fn render(power: &ZonePower<'_>, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_single(
        &global.output,
        power,
        |p| match p.source {
            Some(source) if !source.is_empty() => format!(
                "{}: {} ({source})",
                p.zone,
                output::power_label(p.is_on, color)
            ),
            _ => format!("{}: {}", p.zone, output::power_label(p.is_on, color)),
        },
        |p| output::power_label(p.is_on, false),
    )
}

pub async fn get(bridge: &BridgeConfig, zone: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let client = bridge
        .client()
        .map_err(|e| CliError::from_sync(e, &bridge.base_url))?;

    let record = client
        .get_zone_record(zone)
        .await
        .map_err(|e| CliError::from_sync(e.into(), &bridge.base_url))?;

    let out = render(
        &ZonePower {
            zone: &record.name,
            is_on: record.is_on,
            source: Some(&record.source_name),
        },
        global,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Accepted by the controller means queued, not applied; a later `get`
/// shows whether the zone actually switched.
pub async fn set(
    bridge: &BridgeConfig,
    zone: &str,
    state: PowerArg,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = bridge
        .client()
        .map_err(|e| CliError::from_sync(e, &bridge.base_url))?;

    client
        .set_zone_state(zone, state.is_on())
        .await
        .map_err(|e| CliError::from_sync(e.into(), &bridge.base_url))?;

    let out = render(
        &ZonePower {
            zone,
            is_on: state.is_on(),
            source: None,
        },
        global,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
