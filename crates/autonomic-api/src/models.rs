// MAS wire types
//
// The controller publishes the zone list under two envelopes:
//
//   nested: { "browse": { "Items": [ <zone>, ... ] } }
//   flat:   { "Items": [ <zone>, ... ] }
//
// Both are tried in that order. Fields the sync engine does not consume use
// `#[serde(default)]`, since firmware versions disagree about which are present.

use serde::{Deserialize, Serialize};

use crate::client::body_preview;
use crate::error::Error;

// ── Zone record ─────────────────────────────────────────────────────

/// One zone as reported by `mrad.browsezones`.
///
/// Only `Name` and `IsOn` drive synchronization; the rest is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneRecord {
    #[serde(default)]
    pub zone_id: String,
    pub is_on: bool,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub group_name: String,
    pub name: String,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub source_meta_data: Option<SourceMetaData>,
}

/// Now-playing metadata attached to a zone's active source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceMetaData {
    #[serde(default)]
    pub art_url: Option<String>,
    #[serde(default)]
    pub display_line1: Option<String>,
    #[serde(default)]
    pub display_line2: Option<String>,
    #[serde(default)]
    pub display_line3: Option<String>,
    #[serde(default)]
    pub display_line4: Option<String>,
}

// ── Envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NestedEnvelope {
    browse: ZoneItems,
}

#[derive(Debug, Deserialize)]
struct ZoneItems {
    #[serde(rename = "Items")]
    items: Vec<ZoneRecord>,
}

/// Parse a zone-list body, trying the nested envelope first and the flat
/// one second. A failure on the first shape never prevents the second.
pub fn parse_zone_list(body: &str) -> Result<Vec<ZoneRecord>, Error> {
    let nested_err = match serde_json::from_str::<NestedEnvelope>(body) {
        Ok(envelope) => return Ok(envelope.browse.items),
        Err(e) => e,
    };

    match serde_json::from_str::<ZoneItems>(body) {
        Ok(flat) => Ok(flat.items),
        Err(flat_err) => Err(Error::Protocol {
            message: format!(
                "nested envelope: {nested_err}; flat envelope: {flat_err} (body preview: {:?})",
                body_preview(body)
            ),
            body: body.to_owned(),
        }),
    }
}

/// Look up a zone's power state by exact name match.
pub fn zone_power(zones: &[ZoneRecord], name: &str) -> Option<bool> {
    zones.iter().find(|z| z.name == name).map(|z| z.is_on)
}

// ── Power command ───────────────────────────────────────────────────

/// A `mrad.SetZone` script invocation switching one zone on or off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand<'a> {
    pub zone: &'a str,
    pub is_on: bool,
}

impl PowerCommand<'_> {
    /// The `On` / `Off` literal the script expects.
    pub fn power_word(&self) -> &'static str {
        if self.is_on { "On" } else { "Off" }
    }

    /// Path segments under `{base}/Script/`, including the trailing empty
    /// segment that yields the required trailing slash.
    pub fn segments(&self) -> [String; 4] {
        [
            format!("mrad.SetZone {}", self.zone),
            format!("mrad.power {}", self.power_word()),
            "setinstance main".to_owned(),
            String::new(),
        ]
    }
}
