#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures for the core integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autonomic_api::TransportConfig;
use autonomic_core::{AccessorySink, ZoneClient, ZoneRecord};

pub const BROWSE_PATH: &str = "/api/mrad.browsezones";

/// Sink that remembers every value pushed to it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

impl AccessorySink for RecordingSink {
    fn set_power_state(&self, is_on: bool) {
        self.calls.lock().unwrap().push(is_on);
    }

    fn power_state(&self) -> Option<bool> {
        self.calls.lock().unwrap().last().copied()
    }
}

pub fn client_for(server: &MockServer) -> ZoneClient {
    ZoneClient::new(
        Url::parse(&server.uri()).unwrap(),
        &TransportConfig::with_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

pub fn zone_json(name: &str, is_on: bool) -> serde_json::Value {
    json!({
        "ZoneId": format!("id-{name}"),
        "IsOn": is_on,
        "SourceName": "Radio",
        "GroupName": "House",
        "Name": name,
        "Guid": format!("guid-{name}")
    })
}

pub fn records(zones: &[(&str, bool)]) -> Vec<ZoneRecord> {
    zones
        .iter()
        .map(|(name, is_on)| serde_json::from_value(zone_json(name, *is_on)).unwrap())
        .collect()
}

/// Replace every mock on `server` with a browse response listing `zones`.
pub async fn serve_zones(server: &MockServer, zones: &[(&str, bool)]) {
    server.reset().await;
    let items: Vec<_> = zones.iter().map(|(n, on)| zone_json(n, *on)).collect();
    Mock::given(method("GET"))
        .and(path(BROWSE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "browse": { "Items": items } })),
        )
        .mount(server)
        .await;
}

/// Poll `cond` until it holds or five seconds pass.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

/// Number of requests the server has seen with the given method.
pub async fn request_count(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .count()
}
