//! Test fixtures: a running router and recording handlers

use bytes::Bytes;
use codec::ReactorId;
use fabric_config::{ReactorConfig, RouterConfig, TransportSettings};
use network::PeerRegistry;
use reactor::{DeliveryFailure, ReactorContext, ReactorHandler, ReactorNode, RetryPolicy};
use router::{Router, RouterMetrics, RouterMetricsSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Upper bound for anything a scenario waits on
pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Router running on its own task
pub struct RunningRouter {
    pub address: String,
    transport: TransportSettings,
    peers: PeerRegistry,
    metrics: Arc<RouterMetrics>,
    shutdown: CancellationToken,
    handle: JoinHandle<router::Result<()>>,
}

impl RunningRouter {
    /// Bind an ephemeral local TCP port
    pub async fn start() -> Self {
        Self::start_at("tcp://127.0.0.1:0").await
    }

    pub async fn start_at(address: &str) -> Self {
        Self::start_with(address, TransportSettings::default()).await
    }

    /// Router and every node it connects share `transport`
    pub async fn start_with(address: &str, transport: TransportSettings) -> Self {
        init_test_logging();
        let router = Router::bind(&RouterConfig::with_address(address), &transport).await;
        assert!(!router.binding_failed(), "router failed to bind {address}");

        let address = router.local_addr().unwrap_or(address).to_string();
        let peers = router.peers().unwrap_or_default();
        let metrics = router.metrics_handle();
        let shutdown = CancellationToken::new();
        let handle = router.spawn(shutdown.clone());

        Self {
            address,
            transport,
            peers,
            metrics,
            shutdown,
            handle,
        }
    }

    pub fn reactor_config(&self) -> ReactorConfig {
        ReactorConfig::with_address(self.address.clone())
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn metrics(&self) -> RouterMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Connect a node and wait until the router has registered it
    pub async fn connect<H: ReactorHandler>(&self, id: u64, handler: H) -> ReactorNode {
        let expected = self.peers.len() + 1;
        let node = ReactorNode::connect(
            ReactorId::new(id),
            &self.reactor_config(),
            &self.transport,
            handler,
        )
        .await;
        assert!(node.is_connected(), "node {id} failed to connect");
        self.wait_for_peers(expected).await;
        node
    }

    pub async fn wait_for_peers(&self, count: usize) {
        let peers = self.peers.clone();
        wait_until(move || peers.len() == count)
            .await
            .unwrap_or_else(|| panic!("router never reached {count} peers"));
    }

    pub async fn wait_for_metrics(&self, predicate: impl Fn(&RouterMetricsSnapshot) -> bool) {
        let metrics = Arc::clone(&self.metrics);
        wait_until(move || predicate(&metrics.snapshot()))
            .await
            .unwrap_or_else(|| panic!("router metrics never matched: {:?}", self.metrics()));
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let result = tokio::time::timeout(WAIT, self.handle)
            .await
            .expect("router did not stop")
            .expect("router task panicked");
        assert!(result.is_ok());
    }
}

/// Poll `condition` until it holds or [`WAIT`] passes
pub async fn wait_until(condition: impl Fn() -> bool) -> Option<()> {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .ok()
}

/// What a [`RecordingHandler`] observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message(Bytes),
    Failure {
        destination: ReactorId,
        attempts: u32,
        payload: Bytes,
    },
}

impl Event {
    pub fn message(payload: &'static str) -> Self {
        Event::Message(Bytes::from_static(payload.as_bytes()))
    }

    pub fn failure(destination: u64, attempts: u32, payload: &'static str) -> Self {
        Event::Failure {
            destination: ReactorId::new(destination),
            attempts,
            payload: Bytes::from_static(payload.as_bytes()),
        }
    }
}

/// Records every event and optionally applies a retry policy to failures
pub struct RecordingHandler {
    events: mpsc::UnboundedSender<Event>,
    retry: Option<RetryPolicy>,
}

impl RecordingHandler {
    pub fn new() -> (Self, Recorder) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events, retry: None }, Recorder { events: rx })
    }

    pub fn with_retry(policy: RetryPolicy) -> (Self, Recorder) {
        let (mut handler, recorder) = Self::new();
        handler.retry = Some(policy);
        (handler, recorder)
    }
}

impl ReactorHandler for RecordingHandler {
    fn on_message(&mut self, _ctx: &ReactorContext, payload: Bytes) {
        let _ = self.events.send(Event::Message(payload));
    }

    fn on_delivery_failure(&mut self, ctx: &ReactorContext, failure: DeliveryFailure) {
        let _ = self.events.send(Event::Failure {
            destination: failure.destination(),
            attempts: failure.attempts(),
            payload: failure.payload().clone(),
        });
        if let Some(policy) = self.retry {
            let _ = policy.apply(ctx, &failure);
        }
    }
}

/// Receiving end of a [`RecordingHandler`]
pub struct Recorder {
    events: mpsc::UnboundedReceiver<Event>,
}

impl Recorder {
    pub async fn next(&mut self) -> Event {
        tokio::time::timeout(WAIT, self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("handler dropped")
    }

    /// Assert nothing arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(event)) = tokio::time::timeout(window, self.events.recv()).await {
            panic!("unexpected event: {event:?}");
        }
    }
}
