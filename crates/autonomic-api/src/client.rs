// MAS REST HTTP client
//
// Wraps `reqwest::Client` with MAS-specific URL construction and status
// handling. The zone endpoints live in `zones.rs` as inherent methods to
// keep this module focused on transport mechanics.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Upper bound on the body preview carried in errors and logs.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the MAS controller.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so each zone engine can hold its own handle to one shared connection pool.
#[derive(Debug, Clone)]
pub struct ZoneClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl ZoneClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the MAS API root as the controller publishes it
    /// (e.g. `http://mas.local:5005/api`). Endpoint paths are appended
    /// segment-wise, so a trailing slash is optional.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        ensure_base(&base_url)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for configuring timeouts on `http`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        ensure_base(&base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append `segments` to the base URL, percent-encoding each one.
    ///
    /// An empty final segment produces a trailing slash, which the MAS
    /// script endpoint requires.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the body of a 2xx response.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text().await.map_err(|e| self.transport_error(e))
    }

    /// Send a body-less POST. Any 2xx counts as accepted; the body is ignored.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    /// Classify a reqwest failure, surfacing timeouts with the configured bound.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn body_preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn ensure_base(url: &Url) -> Result<(), Error> {
    if url.cannot_be_a_base() {
        return Err(Error::CannotBeABase(url.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use url::Url;

    use super::{ZoneClient, body_preview};

    fn client(base: &str) -> ZoneClient {
        ZoneClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn endpoint_appends_under_base_path() {
        let c = client("http://mas.local:5005/api");
        let url = c.endpoint(&["api", "mrad.browsezones"]).unwrap();
        assert_eq!(url.as_str(), "http://mas.local:5005/api/api/mrad.browsezones");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_on_base() {
        let c = client("http://mas.local:5005/");
        let url = c.endpoint(&["api", ""]).unwrap();
        assert_eq!(url.as_str(), "http://mas.local:5005/api/");
    }

    #[test]
    fn endpoint_encodes_spaces_and_slashes_in_segments() {
        let c = client("http://mas.local");
        let url = c
            .endpoint(&["Script", "mrad.SetZone Kids/Den", "mrad.power On", ""])
            .unwrap();
        assert_eq!(
            url.path(),
            "/Script/mrad.SetZone%20Kids%2FDen/mrad.power%20On/"
        );
    }

    #[test]
    fn non_hierarchical_base_is_rejected() {
        let url = Url::parse("mailto:mas@example.com").unwrap();
        assert!(ZoneClient::with_client(reqwest::Client::new(), url).is_err());
    }

    #[test]
    fn body_preview_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        assert_eq!(body_preview(&long).chars().count(), 200);
        assert_eq!(body_preview("short"), "short");
    }
}
