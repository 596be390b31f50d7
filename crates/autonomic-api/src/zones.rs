// Zone endpoints
//
// Listing tries `api/mrad.browsezones` first and falls back to the bare
// `api/` endpoint; each body is parsed against both envelope shapes.

use tracing::debug;
use url::Url;

use crate::client::ZoneClient;
use crate::error::Error;
use crate::models::{PowerCommand, ZoneRecord, parse_zone_list, zone_power};

impl ZoneClient {
    /// List every zone the controller reports.
    ///
    /// `GET api/mrad.browsezones`, then `GET api/` if the first attempt
    /// fails for any reason. When both fail, a protocol error wins over a
    /// transport error: it proves the controller is reachable.
    pub async fn list_zones(&self) -> Result<Vec<ZoneRecord>, Error> {
        let browse = self.endpoint(&["api", "mrad.browsezones"])?;
        let bare = self.endpoint(&["api", ""])?;

        let first = match self.fetch_zone_list(browse).await {
            Ok(zones) => return Ok(zones),
            Err(e) => e,
        };
        debug!(error = %first, "browsezones endpoint failed, trying bare api endpoint");

        match self.fetch_zone_list(bare).await {
            Ok(zones) => Ok(zones),
            Err(second) if !second.is_protocol() && first.is_protocol() => Err(first),
            Err(second) => Err(second),
        }
    }

    /// Fetch the full record for one zone.
    pub async fn get_zone_record(&self, name: &str) -> Result<ZoneRecord, Error> {
        self.list_zones()
            .await?
            .into_iter()
            .find(|z| z.name == name)
            .ok_or_else(|| Error::ZoneNotFound { name: name.into() })
    }

    /// Fetch one zone's power state.
    pub async fn get_zone(&self, name: &str) -> Result<bool, Error> {
        let zones = self.list_zones().await?;
        zone_power(&zones, name).ok_or_else(|| Error::ZoneNotFound { name: name.into() })
    }

    /// Switch a zone on or off.
    ///
    /// `POST Script/mrad.SetZone {zone}/mrad.power {On|Off}/setinstance main/`
    ///
    /// Success means the controller accepted the request, not that the
    /// zone has changed; confirmation only arrives through a later poll.
    pub async fn set_zone_state(&self, name: &str, is_on: bool) -> Result<(), Error> {
        let command = PowerCommand { zone: name, is_on };
        let segments = command.segments();

        let mut path: Vec<&str> = Vec::with_capacity(segments.len() + 1);
        path.push("Script");
        path.extend(segments.iter().map(String::as_str));

        let url = self.endpoint(&path)?;
        debug!(zone = name, power = command.power_word(), "sending zone power command");
        self.post_empty(url).await
    }

    async fn fetch_zone_list(&self, url: Url) -> Result<Vec<ZoneRecord>, Error> {
        let body = self.get_text(url).await?;
        parse_zone_list(&body)
    }
}
