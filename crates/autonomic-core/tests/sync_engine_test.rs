#![allow(clippy::unwrap_used)]
// Integration tests for `SyncEngine` against a wiremock controller.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autonomic_core::{
    EnginePhase, Origin, SyncEngine, SyncError, SyncSettings, Transition, ZoneIdentity,
    accessory_channel,
};
use common::{
    BROWSE_PATH, RecordingSink, client_for, records, request_count, serve_zones, wait_until,
    zone_json,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn engine_for(
    server: &MockServer,
    zone: &str,
    settings: SyncSettings,
) -> (SyncEngine, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let engine = SyncEngine::new(
        ZoneIdentity::new(zone, "001"),
        client_for(server),
        sink.clone(),
        &settings,
    );
    (engine, sink)
}

fn slow_polls() -> SyncSettings {
    SyncSettings {
        poll_interval: Duration::from_secs(3600),
        ..SyncSettings::default()
    }
}

// ── Poll path ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_remote_turn_on_reaches_accessory() {
    let server = MockServer::start().await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());

    // Loft is known to be off.
    engine.apply_poll(&records(&[("Loft", false)])).unwrap();
    assert_eq!(sink.calls(), vec![false]);

    serve_zones(&server, &[("Loft", true), ("Kitchen", false)]).await;
    let transition = engine.poll_once().await.unwrap();

    assert_eq!(transition, Transition::ChangedFromRemote);
    assert_eq!(sink.calls(), vec![false, true]);
    assert!(engine.state().is_on);
    assert_eq!(engine.state().origin, Origin::Remote);
    assert_eq!(engine.phase(), EnginePhase::Idle);
}

#[tokio::test]
async fn test_repeated_equal_poll_is_silent() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Loft", true)]).await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());

    assert_eq!(engine.poll_once().await.unwrap(), Transition::ChangedFromRemote);
    assert_eq!(engine.poll_once().await.unwrap(), Transition::Unchanged);
    assert_eq!(engine.poll_once().await.unwrap(), Transition::Unchanged);

    assert_eq!(sink.calls(), vec![true]);
}

#[tokio::test]
async fn test_missing_zone_leaves_state_untouched() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Kitchen", true)]).await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());
    let before = engine.state();

    let result = engine.poll_once().await;

    match result {
        Err(SyncError::ZoneNotFound { ref zone }) => assert_eq!(zone, "Loft"),
        other => panic!("expected ZoneNotFound, got: {other:?}"),
    }
    assert_eq!(engine.state(), before);
    assert_eq!(engine.state().origin, Origin::Unknown);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_poll_failure_is_recoverable_and_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());
    engine.apply_poll(&records(&[("Loft", true)])).unwrap();

    let err = engine.poll_once().await.unwrap_err();

    assert!(err.is_recoverable());
    assert!(matches!(err, SyncError::Transport { status: Some(503), .. }));
    assert!(engine.state().is_on);
    assert_eq!(sink.calls(), vec![true]);
    assert_eq!(engine.phase(), EnginePhase::Idle);
}

#[tokio::test]
async fn test_unrecognized_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());

    let err = engine.poll_once().await.unwrap_err();

    assert!(matches!(err, SyncError::Protocol { .. }), "got: {err:?}");
    assert!(sink.calls().is_empty());
}

// ── Write path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_pending_write_inside_grace_is_not_reverted() {
    let server = MockServer::start().await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());
    engine.apply_poll(&records(&[("Loft", false)])).unwrap();

    engine.submit_local_write(true);
    let transition = engine.apply_poll(&records(&[("Loft", false)])).unwrap();

    assert_eq!(transition, Transition::Unchanged);
    assert!(engine.state().is_on);
    assert_eq!(engine.state().origin, Origin::Local);
    assert_eq!(sink.calls(), vec![false]);
}

#[tokio::test]
async fn test_pending_write_overridden_after_grace() {
    let server = MockServer::start().await;
    let settings = SyncSettings {
        write_grace: Duration::ZERO,
        ..slow_polls()
    };
    let (engine, sink) = engine_for(&server, "Loft", settings);
    engine.apply_poll(&records(&[("Loft", false)])).unwrap();

    engine.submit_local_write(true);
    let transition = engine.apply_poll(&records(&[("Loft", false)])).unwrap();

    assert_eq!(transition, Transition::PendingWriteOverridden);
    assert!(!engine.state().is_on);
    assert_eq!(engine.snapshot().pending, None);
    assert_eq!(sink.calls(), vec![false, false]);
}

#[tokio::test]
async fn test_slow_poll_started_before_toggle_does_not_revert_it() {
    let server = MockServer::start().await;
    let settings = SyncSettings {
        write_grace: Duration::from_secs(1),
        ..slow_polls()
    };
    let (engine, sink) = engine_for(&server, "Loft", settings);
    engine.apply_poll(&records(&[("Loft", false)])).unwrap();

    // Controller still reports the pre-toggle value, and answers slowly.
    Mock::given(method("GET"))
        .and(path(BROWSE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "browse": { "Items": [zone_json("Loft", false)] } }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let polling = tokio::spawn({
        let engine = engine.clone();
        async move { engine.poll_once().await }
    });
    for _ in 0..500 {
        if request_count(&server, "GET").await > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    engine.submit_local_write(true);
    let watch = engine.watch();

    // Response lands after the grace window has expired.
    let transition = polling.await.unwrap().unwrap();

    assert_eq!(transition, Transition::Unchanged);
    assert!(engine.state().is_on);
    assert_eq!(engine.state().origin, Origin::Local);
    assert!(engine.snapshot().pending.is_some());
    assert_eq!(watch.latest(), *watch.current());
    assert_eq!(sink.calls(), vec![false]);
}

#[tokio::test]
async fn test_failed_write_keeps_optimistic_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let (engine, sink) = engine_for(&server, "Loft", slow_polls());
    engine.apply_poll(&records(&[("Loft", true)])).unwrap();

    engine.submit_local_write(false);
    let err = engine.write_through(false).await.unwrap_err();

    assert!(err.is_recoverable());
    assert!(!engine.state().is_on);
    assert_eq!(engine.state().origin, Origin::Local);
    assert!(engine.snapshot().pending.is_some());
    assert_eq!(sink.calls(), vec![true]);
}

// ── Run loop ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_kitchen_toggle_is_written_then_confirmed() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Kitchen", true)]).await;
    Mock::given(method("POST"))
        .and(path(
            "/Script/mrad.SetZone%20Kitchen/mrad.power%20Off/setinstance%20main/",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, sink) = engine_for(&server, "Kitchen", slow_polls());
    let (intents, source) = accessory_channel();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(engine.clone().run(source, cancel.clone()));

    // Initial poll runs without waiting for the interval.
    wait_until(|| sink.calls() == vec![true]).await;

    assert!(intents.power_changed(false));
    let mut posts = 0;
    for _ in 0..500 {
        posts = request_count(&server, "POST").await;
        if posts > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(posts, 1);
    assert!(!engine.state().is_on);

    serve_zones(&server, &[("Kitchen", false)]).await;
    let transition = engine.poll_once().await.unwrap();

    assert_eq!(transition, Transition::ConfirmedPendingWrite);
    assert_eq!(sink.calls(), vec![true]);
    assert_eq!(engine.snapshot().pending, None);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_run_polls_on_interval_until_cancelled() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Loft", true)]).await;
    let settings = SyncSettings {
        poll_interval: Duration::from_millis(20),
        ..SyncSettings::default()
    };
    let (engine, sink) = engine_for(&server, "Loft", settings);
    let (_intents, source) = accessory_channel();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(engine.clone().run(source, cancel.clone()));

    let mut gets = 0;
    for _ in 0..500 {
        gets = request_count(&server, "GET").await;
        if gets >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(gets >= 3, "expected repeated polls, saw {gets}");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    // Only the first poll changed anything.
    assert_eq!(sink.calls(), vec![true]);
    assert_eq!(engine.phase(), EnginePhase::Idle);
}

#[tokio::test]
async fn test_queued_writes_are_sent_before_run_returns() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Loft", false)]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(2)
        .mount(&server)
        .await;

    let (engine, sink) = engine_for(&server, "Loft", slow_polls());
    let (intents, source) = accessory_channel();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(engine.clone().run(source, cancel.clone()));
    wait_until(|| sink.calls() == vec![false]).await;

    // First command goes in flight, the second waits behind it.
    assert!(intents.power_changed(true));
    assert!(intents.power_changed(false));
    wait_until(|| engine.phase() == EnginePhase::Writing).await;
    wait_until(|| engine.snapshot().pending.map(|p| p.desired_state) == Some(false)).await;

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let posts: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| r.url.path().to_owned())
        .collect();
    assert_eq!(
        posts,
        vec![
            "/Script/mrad.SetZone%20Loft/mrad.power%20On/setinstance%20main/".to_owned(),
            "/Script/mrad.SetZone%20Loft/mrad.power%20Off/setinstance%20main/".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_second_run_returns_immediately() {
    let server = MockServer::start().await;
    serve_zones(&server, &[("Loft", true)]).await;
    let (engine, _sink) = engine_for(&server, "Loft", slow_polls());

    let cancel = CancellationToken::new();
    let (_first_intents, first) = accessory_channel();
    let handle = tokio::spawn(engine.clone().run(first, cancel.clone()));
    for _ in 0..500 {
        if request_count(&server, "GET").await > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let (_second_intents, second) = accessory_channel();
    let other = CancellationToken::new();
    tokio::time::timeout(Duration::from_secs(5), engine.clone().run(second, other))
        .await
        .unwrap();

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
