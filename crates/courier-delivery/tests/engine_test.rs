//! Integration tests for the drain loop, routing, and bounded retry.
//!
//! Runs the full engine against wiremock destinations and asserts on the
//! requests the destination actually received.

use std::{collections::HashMap, sync::Arc, time::Duration};

use bytes::Bytes;
use courier_core::Message;
use courier_delivery::{ClientConfig, EngineConfig, RelayEngine, RetryPolicy, RouteTable};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn test_engine(routes: RouteTable) -> Arc<RelayEngine> {
    let config = EngineConfig {
        client: ClientConfig { timeout: Duration::from_secs(5), ..Default::default() },
        retry: RetryPolicy { max_attempts: 3, delay: Duration::from_millis(100) },
        routes,
        queue_capacity: None,
    };
    Arc::new(RelayEngine::new(config).expect("engine creation"))
}

fn test_message(body: &str) -> Message {
    Message::new(Bytes::copy_from_slice(body.as_bytes()), "Bearer abc".to_string())
}

/// Polls the mock server until it has seen `count` requests or a timeout
/// elapses. Delivery is fire-and-forget, so tests observe it from the
/// destination's side.
async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {count} requests");
}

#[tokio::test]
async fn admitted_message_is_delivered_once() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::body_bytes(b"{\"x\":1}".to_vec()))
        .and(matchers::header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = test_engine(RouteTable::with_default(mock_server.uri()));
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 1).await;
    // Extra settling time to catch an erroneous duplicate delivery.
    tokio::time::sleep(Duration::from_millis(300)).await;
    mock_server.verify().await;

    let stats = engine.stats().await;
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.retried, 0);
    assert_eq!(stats.dropped, 0);
}

#[tokio::test]
async fn typed_payload_routes_to_mapped_destination() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/tasks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/events"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut routes = HashMap::new();
    routes.insert("task".to_string(), format!("{}/tasks", mock_server.uri()));
    let table = RouteTable::new(routes, format!("{}/events", mock_server.uri()));

    let engine = test_engine(table);
    engine.admit(test_message("{\"type\":\"task\",\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 1).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn untyped_payload_routes_to_default_destination() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/events"))
        .and(matchers::body_bytes(b"{\"x\":1}".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut routes = HashMap::new();
    routes.insert("task".to_string(), format!("{}/tasks", mock_server.uri()));
    let table = RouteTable::new(routes, format!("{}/events", mock_server.uri()));

    let engine = test_engine(table);
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 1).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn failing_destination_gets_exactly_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let engine = test_engine(RouteTable::with_default(mock_server.uri()));
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 3).await;
    // Settle past one more retry delay to prove there is no 4th attempt.
    tokio::time::sleep(Duration::from_millis(400)).await;
    mock_server.verify().await;

    let stats = engine.stats().await;
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.retried, 2);
    assert_eq!(stats.dropped, 1);
    assert_eq!(engine.queue_depth(), 0);
}

#[tokio::test]
async fn retries_are_spaced_by_the_configured_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = EngineConfig {
        client: ClientConfig { timeout: Duration::from_secs(5), ..Default::default() },
        retry: RetryPolicy { max_attempts: 3, delay: Duration::from_millis(200) },
        routes: RouteTable::with_default(mock_server.uri()),
        queue_capacity: None,
    };
    let engine = Arc::new(RelayEngine::new(config).expect("engine creation"));

    let started = std::time::Instant::now();
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 3).await;

    // Two retry delays of 200ms must have elapsed between the attempts.
    assert!(started.elapsed() >= Duration::from_millis(400));
    mock_server.verify().await;
}

#[tokio::test]
async fn message_recovers_when_destination_comes_back() {
    let mock_server = MockServer::start().await;

    // First attempt fails, every later one succeeds.
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let engine = test_engine(RouteTable::with_default(mock_server.uri()));
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    wait_for_requests(&mock_server, 2).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let stats = engine.stats().await;
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.retried, 1);
    assert_eq!(stats.dropped, 0);
}

#[tokio::test]
async fn concurrent_admissions_are_all_delivered() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(10)
        .mount(&mock_server)
        .await;

    let engine = test_engine(RouteTable::with_default(mock_server.uri()));

    for i in 0..10 {
        engine.admit(test_message(&format!("{{\"n\":{i}}}"))).expect("admit");
    }

    wait_for_requests(&mock_server, 10).await;
    mock_server.verify().await;

    let stats = engine.stats().await;
    assert_eq!(stats.delivered, 10);
}

#[tokio::test]
async fn slow_delivery_does_not_block_other_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/events"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut routes = HashMap::new();
    routes.insert("slow".to_string(), format!("{}/slow", mock_server.uri()));
    let table = RouteTable::new(routes, format!("{}/events", mock_server.uri()));
    let engine = test_engine(table);

    engine.admit(test_message("{\"type\":\"slow\"}")).expect("admit");
    engine.admit(test_message("{\"x\":1}")).expect("admit");

    // The fast message must land while the slow one is still in flight.
    let started = std::time::Instant::now();
    loop {
        let received = mock_server.received_requests().await.unwrap_or_default();
        if received.iter().any(|r| r.url.path() == "/events") {
            break;
        }
        assert!(
            started.elapsed() < Duration::from_millis(1500),
            "fast message was delayed by the slow delivery"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn bounded_engine_rejects_admissions_beyond_capacity() {
    // No destination: messages stay in flight against a dead port while
    // we fill the queue.
    let config = EngineConfig {
        client: ClientConfig { timeout: Duration::from_secs(5), ..Default::default() },
        retry: RetryPolicy { max_attempts: 3, delay: Duration::from_secs(60) },
        routes: RouteTable::with_default("http://127.0.0.1:1/events"),
        queue_capacity: Some(0),
    };
    let engine = Arc::new(RelayEngine::new(config).expect("engine creation"));

    let err = engine.admit(test_message("{}")).expect_err("no capacity");
    assert_eq!(err.capacity, 0);
}
