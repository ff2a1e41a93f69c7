//! Integration tests for the event clients
//!
//! A wiremock server stands in for the ingestion endpoint so the full
//! request (path, headers, body) and the status handling can be checked.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tracklet_core::{AsyncEventClient, ClientConfig, Error, EventClient, TrackEvent};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "sdk_abc";

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri(), SECRET)
}

/// Mock that only matches a correctly addressed and authenticated request
fn events_route() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/api/sdk/events"))
        .and(header("authorization", "Bearer sdk_abc"))
        .and(header("content-type", "application/json"))
}

async fn single_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    serde_json::from_slice(&requests[0].body).unwrap()
}

// ============================================
// Async client
// ============================================

#[tokio::test]
async fn test_track_with_subject_and_properties() {
    tracklet_core::logging::init_test();
    let server = MockServer::start().await;

    events_route()
        .and(body_json(json!({
            "event": "signup",
            "userId": "u1",
            "properties": {"plan": "pro"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    let event = TrackEvent::new("signup")
        .subject_id("u1")
        .property("plan", "pro");

    client.track(&event).await.expect("track should succeed");

    let body = single_request_body(&server).await;
    assert!(body.get("occurredAt").is_none());
}

#[tokio::test]
async fn test_bare_event_sends_null_user_and_empty_properties() {
    let server = MockServer::start().await;

    events_route()
        .and(body_json(json!({
            "event": "ping",
            "userId": null,
            "properties": {}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    client.track(&TrackEvent::new("ping")).await.unwrap();
}

#[tokio::test]
async fn test_default_subject_used_when_omitted() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server).with_default_subject_id("billing-worker");
    let client = AsyncEventClient::new(config).unwrap();

    client.track(&TrackEvent::new("invoice.paid")).await.unwrap();
    client
        .track(&TrackEvent::new("invoice.paid").subject_id("u7"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<Value> = requests
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(bodies[0]["userId"], "billing-worker");
    assert_eq!(bodies[1]["userId"], "u7");
}

#[tokio::test]
async fn test_occurred_at_sent_as_rfc3339() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    client
        .track(&TrackEvent::new("report.generated").occurred_at(ts))
        .await
        .unwrap();

    let body = single_request_body(&server).await;
    let sent = body["occurredAt"].as_str().unwrap();
    assert_eq!(sent, "2025-03-01T12:30:00Z");
    assert_eq!(DateTime::parse_from_rfc3339(sent).unwrap(), ts);
}

#[tokio::test]
async fn test_trailing_slash_base_url_hits_same_route() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(format!("{}/", server.uri()), SECRET);
    let client = AsyncEventClient::new(config).unwrap();
    client.track(&TrackEvent::new("ping")).await.unwrap();
}

#[tokio::test]
async fn test_statuses_below_400_are_success() {
    for status in [304u16, 399] {
        let server = MockServer::start().await;

        events_route()
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let client = AsyncEventClient::new(config_for(&server)).unwrap();
        let result = client.track(&TrackEvent::new("ping")).await;
        assert!(result.is_ok(), "status {} gave {:?}", status, result);
    }
}

#[tokio::test]
async fn test_status_400_is_delivery_error() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"event is required"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    let err = client.track(&TrackEvent::new("ping")).await.unwrap_err();

    assert!(matches!(err, Error::Delivery { status: 400, .. }), "got {:?}", err);
    assert_eq!(err.server_message().as_deref(), Some("event is required"));
}

#[tokio::test]
async fn test_unauthorized_is_delivery_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sdk/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid secret"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    let err = client.track(&TrackEvent::new("ping")).await.unwrap_err();

    match &err {
        Error::Delivery { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, r#"{"error":"invalid secret"}"#);
        }
        other => panic!("expected delivery error, got {:?}", other),
    }
    assert_eq!(err.server_message().as_deref(), Some("invalid secret"));
}

#[tokio::test]
async fn test_server_error_is_delivery_error_without_retry() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(500).set_body_string("Unable to persist event"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    let err = client.track(&TrackEvent::new("ping")).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, Error::Delivery { ref body, .. } if body == "Unable to persist event"));
}

#[tokio::test]
async fn test_identical_calls_send_independent_requests() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server)).unwrap();
    let event = TrackEvent::new("ping").subject_id("u1");
    client.track(&event).await.unwrap();
    client.track(&event).await.unwrap();
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = AsyncEventClient::new(config_for(&server).with_timeout_secs(1)).unwrap();
    let err = client.track(&TrackEvent::new("ping")).await.unwrap_err();

    match err {
        Error::Transport(source) => assert!(source.is_timeout()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_async_calls() {
    let server = MockServer::start().await;

    events_route()
        .respond_with(ResponseTemplate::new(200))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(AsyncEventClient::new(config_for(&server)).unwrap());
    let mut handles = Vec::new();
    for i in 0..8 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client
                .track(&TrackEvent::new("job.finished").property("job", i))
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

// ============================================
// Blocking client
// ============================================
//
// The blocking client owns its own runtime, so these tests run on a plain
// thread and use a separate runtime only to drive the mock server.

fn test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_blocking_track_success() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());

    rt.block_on(
        events_route()
            .and(body_json(json!({
                "event": "signup",
                "userId": "u1",
                "properties": {"plan": "pro"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server),
    );

    let client = EventClient::new(config_for(&server)).unwrap();
    client
        .track(&TrackEvent::new("signup").subject_id("u1").property("plan", "pro"))
        .unwrap();
}

#[test]
fn test_blocking_track_delivery_error() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());

    rt.block_on(
        events_route()
            .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"error":"Missing event name"}"#))
            .mount(&server),
    );

    let client = EventClient::new(config_for(&server)).unwrap();
    let err = client.track(&TrackEvent::new("ping")).unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.server_message().as_deref(), Some("Missing event name"));
}

#[test]
fn test_blocking_client_shared_across_threads() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());

    rt.block_on(
        events_route()
            .respond_with(ResponseTemplate::new(200))
            .expect(4)
            .mount(&server),
    );

    let client = Arc::new(EventClient::new(config_for(&server)).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                client.track(&TrackEvent::new("worker.tick").property("worker", i))
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 4);
}

#[test]
fn test_construction_with_empty_secret_makes_no_request() {
    let rt = test_runtime();
    let server = rt.block_on(MockServer::start());

    let config = ClientConfig::new(server.uri(), "");
    assert!(matches!(EventClient::new(config), Err(Error::Config(_))));

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert!(requests.is_empty());
}
