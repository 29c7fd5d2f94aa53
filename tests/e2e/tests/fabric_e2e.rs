//! End-to-end scenarios: router plus reactor nodes over real sockets

use bytes::Bytes;
use codec::{ReactorId, FAIL_TO_DELIVER, NOTICE_OVERHEAD};
use fabric_config::{ReactorConfig, TransportSettings};
use fabric_e2e_tests::fixtures::wait_until;
use fabric_e2e_tests::{Event, RecordingHandler, RunningRouter};
use network::{DealerSocket, Multipart, TransportOptions};
use reactor::{handler_fn, ReactorError, ReactorNode, RetryPolicy};
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(150);

#[tokio::test]
async fn test_hello_world_is_delivered_once() {
    let router = RunningRouter::start().await;
    let (sender_handler, mut sender_events) = RecordingHandler::new();
    let (receiver_handler, mut receiver_events) = RecordingHandler::new();

    let sender = router.connect(10, sender_handler).await;
    let _receiver = router.connect(7, receiver_handler).await;

    sender.send(ReactorId::new(7), "Hello World!").unwrap();

    assert_eq!(receiver_events.next().await, Event::message("Hello World!"));
    receiver_events.expect_silence(QUIET).await;
    sender_events.expect_silence(QUIET).await;

    let metrics = router.metrics();
    assert_eq!(metrics.forwarded, 1);
    assert_eq!(metrics.failure_notices, 0);

    router.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_destination_notifies_sender() {
    let router = RunningRouter::start().await;
    let (handler, mut events) = RecordingHandler::new();
    let node = router.connect(5, handler).await;

    node.send(ReactorId::new(99), "ping").unwrap();

    assert_eq!(events.next().await, Event::failure(99, 0, "ping"));
    events.expect_silence(QUIET).await;
    assert_eq!(node.metrics().delivery_failures, 1);

    router.shutdown().await;
}

#[tokio::test]
async fn test_envelope_filling_the_unit_limit_still_gets_a_notice() {
    let transport = TransportSettings {
        max_unit_size: 64,
        ..TransportSettings::default()
    };
    let router = RunningRouter::start_with("tcp://127.0.0.1:0", transport).await;
    let (handler, mut events) = RecordingHandler::new();
    let node = router.connect(5, handler).await;

    // Envelope framing is 28 bytes, so 64 - 28 - NOTICE_OVERHEAD = 17
    let largest = "x".repeat(64 - 28 - NOTICE_OVERHEAD);
    node.send(ReactorId::new(99), largest.clone()).unwrap();
    match events.next().await {
        Event::Failure {
            destination,
            attempts,
            payload,
        } => {
            assert_eq!(destination, ReactorId::new(99));
            assert_eq!(attempts, 0);
            assert_eq!(payload, Bytes::from(largest));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // One byte more, or a payload filling the whole unit, is refused up front
    for len in [64 - 28 - NOTICE_OVERHEAD + 1, 36] {
        assert!(matches!(
            node.send(ReactorId::new(99), vec![b'x'; len]),
            Err(ReactorError::PayloadTooLarge { .. })
        ));
    }
    events.expect_silence(QUIET).await;
    assert_eq!(router.metrics().undeliverable_notices, 0);

    router.shutdown().await;
}

#[tokio::test]
async fn test_retry_policy_makes_four_attempts() {
    let router = RunningRouter::start().await;
    let (handler, mut events) = RecordingHandler::with_retry(RetryPolicy::default());
    let node = router.connect(5, handler).await;

    node.send(ReactorId::new(99), "ping").unwrap();

    for attempt in 0..=3 {
        assert_eq!(events.next().await, Event::failure(99, attempt, "ping"));
    }
    events.expect_silence(QUIET).await;

    router.wait_for_metrics(|m| m.failure_notices == 4).await;
    let metrics = node.metrics();
    assert_eq!(metrics.sent, 1);
    assert_eq!(metrics.resent, 3);
    assert_eq!(metrics.delivery_failures, 4);

    router.shutdown().await;
}

#[tokio::test]
async fn test_retry_succeeds_once_destination_appears() {
    let router = RunningRouter::start().await;
    let (handler, mut sender_events) = RecordingHandler::with_retry(RetryPolicy::new(100_000));
    let sender = router.connect(5, handler).await;

    sender.send(ReactorId::new(8), "late").unwrap();
    assert_eq!(sender_events.next().await, Event::failure(8, 0, "late"));

    let (receiver_handler, mut receiver_events) = RecordingHandler::new();
    let _receiver = ReactorNode::connect(
        ReactorId::new(8),
        &router.reactor_config(),
        &TransportSettings::default(),
        receiver_handler,
    )
    .await;

    assert_eq!(receiver_events.next().await, Event::message("late"));
    router.shutdown().await;
}

#[tokio::test]
async fn test_handler_can_reply_through_context() {
    let router = RunningRouter::start().await;
    let (client_handler, mut client_events) = RecordingHandler::new();
    let client = router.connect(10, client_handler).await;

    let echo = handler_fn(
        |ctx, payload: Bytes| {
            let mut reply = b"echo: ".to_vec();
            reply.extend_from_slice(&payload);
            ctx.send(ReactorId::new(10), reply).unwrap();
        },
        |_, _| {},
    );
    let _server = router.connect(7, echo).await;

    client.send(ReactorId::new(7), "hi").unwrap();
    assert_eq!(client_events.next().await, Event::message("echo: hi"));

    router.shutdown().await;
}

#[tokio::test]
async fn test_marker_payload_is_an_ordinary_message() {
    let router = RunningRouter::start().await;
    let (sender_handler, mut sender_events) = RecordingHandler::new();
    let (receiver_handler, mut receiver_events) = RecordingHandler::new();
    let sender = router.connect(1, sender_handler).await;
    let _receiver = router.connect(2, receiver_handler).await;

    sender.send(ReactorId::new(2), FAIL_TO_DELIVER).unwrap();

    assert_eq!(receiver_events.next().await, Event::message(FAIL_TO_DELIVER));
    sender_events.expect_silence(QUIET).await;
    router.shutdown().await;
}

#[tokio::test]
async fn test_stop_is_idempotent_and_disables_send() {
    let router = RunningRouter::start().await;
    let (handler, _events) = RecordingHandler::new();
    let mut node = router.connect(5, handler).await;

    node.stop().await;
    node.stop().await;

    assert!(!node.is_connected());
    assert!(matches!(
        node.send(ReactorId::new(7), "too late"),
        Err(ReactorError::NotConnected { .. })
    ));
    router.wait_for_peers(0).await;

    router.shutdown().await;
}

#[tokio::test]
async fn test_connect_failure_is_not_fatal() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("tcp://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = ReactorConfig {
        stop_timeout_ms: 100,
        ..ReactorConfig::with_address(address)
    };
    let transport = TransportSettings {
        connect_timeout_ms: 500,
        ..TransportSettings::default()
    };
    let (handler, _events) = RecordingHandler::new();
    let mut node = ReactorNode::connect(ReactorId::new(5), &config, &transport, handler).await;

    assert!(!node.is_connected());
    assert!(node.send(ReactorId::new(7), "nowhere").is_err());
    node.stop().await;
}

#[tokio::test]
async fn test_duplicate_identity_is_rejected() {
    let router = RunningRouter::start().await;
    let (first_handler, mut first_events) = RecordingHandler::new();
    let _first = router.connect(7, first_handler).await;

    let (second_handler, _second_events) = RecordingHandler::new();
    let second = ReactorNode::connect(
        ReactorId::new(7),
        &router.reactor_config(),
        &TransportSettings::default(),
        second_handler,
    )
    .await;
    assert!(
        wait_until(|| !second.is_connected()).await.is_some(),
        "duplicate node stayed connected"
    );
    assert_eq!(router.peer_count(), 1);

    let (sender_handler, _sender_events) = RecordingHandler::new();
    let sender = router.connect(3, sender_handler).await;
    sender.send(ReactorId::new(7), "to the original").unwrap();
    assert_eq!(first_events.next().await, Event::message("to the original"));

    router.shutdown().await;
}

#[tokio::test]
async fn test_malformed_units_are_dropped() {
    let router = RunningRouter::start().await;
    let (handler, mut events) = RecordingHandler::new();
    let _node = router.connect(7, handler).await;

    let raw = DealerSocket::connect(
        &router.address,
        ReactorId::new(66).to_frame(),
        TransportOptions::default(),
    )
    .await
    .unwrap();
    router.wait_for_peers(2).await;

    raw.send(Multipart::from(vec![ReactorId::new(7).to_frame()]))
        .unwrap();
    router.wait_for_metrics(|m| m.malformed == 1).await;
    events.expect_silence(QUIET).await;

    router.shutdown().await;
}

#[tokio::test]
async fn test_node_notices_router_shutdown() {
    let router = RunningRouter::start().await;
    let (handler, _events) = RecordingHandler::new();
    let node = router.connect(5, handler).await;

    router.shutdown().await;

    assert!(
        wait_until(|| !node.is_connected()).await.is_some(),
        "node still connected after router shutdown"
    );
}

#[tokio::test]
async fn test_hello_world_over_ipc() {
    let dir = tempfile::tempdir().unwrap();
    let address = format!("ipc://{}", dir.path().join("fabric.sock").display());
    let router = RunningRouter::start_at(&address).await;

    let (sender_handler, _sender_events) = RecordingHandler::new();
    let (receiver_handler, mut receiver_events) = RecordingHandler::new();
    let sender = router.connect(10, sender_handler).await;
    let _receiver = router.connect(7, receiver_handler).await;

    sender.send(ReactorId::new(7), "Hello World!").unwrap();
    assert_eq!(receiver_events.next().await, Event::message("Hello World!"));

    router.shutdown().await;
}
