//! End-to-end tests: real ingress server, real delivery client, mock
//! downstream target.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::Uri;
use tokio::net::TcpListener;

use relayq::config::RelayConfig;
use relayq::forward::HttpForwarder;
use relayq::http::{ForwardedRequest, RelayServer};
use relayq::lifecycle::Shutdown;
use relayq::retry::Retrier;

mod common;
use common::ReceivedRequest;

/// Wire up a full relay from `config` on an ephemeral port.
async fn start_relay(
    mut config: RelayConfig,
) -> (SocketAddr, Arc<Retrier<ForwardedRequest>>, Shutdown) {
    let shutdown = Shutdown::new();

    let forwarder = HttpForwarder::new(Duration::from_millis(config.forward.request_timeout_ms));
    let retrier = Arc::new(
        Retrier::new(
            Duration::from_millis(config.retry.interval_ms),
            config.retry.capacity,
            config.retry.abort_on_error,
            forwarder,
        )
        .with_max_retries(config.retry.max_retries)
        .with_max_age(Duration::from_millis(config.retry.max_age_ms)),
    );
    retrier.clone().start(shutdown.subscribe());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let target: Uri = config.forward.target.parse().unwrap();
    let server = RelayServer::new(&config, target, retrier.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, retrier, shutdown)
}

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn wait_for<T>(mut probe: impl FnMut() -> Option<T>, timeout: Duration) -> T {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = probe() {
            return value;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn request_is_acknowledged_then_delivered_verbatim() {
    let received: Arc<Mutex<Vec<ReceivedRequest>>> = Arc::default();
    let sink = received.clone();
    let target_addr = common::start_programmable_target(move |request| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(request);
            (200, "ok".to_string())
        }
    })
    .await;

    let mut config = RelayConfig::default();
    config.forward.target = format!("http://{target_addr}");
    config.retry.interval_ms = 100;
    config.retry.abort_on_error = false;
    let (relay_addr, _retrier, shutdown) = start_relay(config).await;

    let response = test_client()
        .post(format!("http://{relay_addr}/hooks/42?source=ci"))
        .header("x-test-header", "present")
        .body("hello relay")
        .send()
        .await
        .expect("relay unreachable");

    // acknowledged before any delivery happened
    assert_eq!(response.status(), 200);

    let delivered = wait_for(
        || received.lock().unwrap().first().cloned(),
        Duration::from_secs(3),
    )
    .await;

    assert_eq!(delivered.method, "POST");
    assert_eq!(delivered.path, "/hooks/42?source=ci");
    assert_eq!(delivered.header("x-test-header"), Some("present"));
    assert_eq!(delivered.body, b"hello relay");

    shutdown.trigger();
}

#[tokio::test]
async fn queue_full_surfaces_as_507() {
    let mut config = RelayConfig::default();
    // nothing listens on the target; the first cycle is far away, so the
    // single slot stays occupied
    config.forward.target = "http://127.0.0.1:9".to_string();
    config.retry.interval_ms = 600_000;
    config.retry.capacity = 1;
    let (relay_addr, retrier, shutdown) = start_relay(config).await;

    let client = test_client();
    let url = format!("http://{relay_addr}/");

    let first = client.post(&url).body("a").send().await.unwrap();
    assert_eq!(first.status(), 200);

    let second = client.post(&url).body("b").send().await.unwrap();
    assert_eq!(second.status(), 507);
    assert_eq!(retrier.queued(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn failed_deliveries_are_retried_until_the_target_recovers() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let target_addr = common::start_programmable_target(move |_request| {
        let counter = counter.clone();
        async move {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            if call < 2 {
                (503, "not yet".to_string())
            } else {
                (200, "ok".to_string())
            }
        }
    })
    .await;

    let mut config = RelayConfig::default();
    config.forward.target = format!("http://{target_addr}");
    config.retry.interval_ms = 100;
    config.retry.abort_on_error = false;
    let (relay_addr, retrier, shutdown) = start_relay(config).await;

    let response = test_client()
        .post(format!("http://{relay_addr}/retry-me"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    wait_for(
        || (calls.load(Ordering::SeqCst) >= 3).then_some(()),
        Duration::from_secs(5),
    )
    .await;

    // delivery succeeded on the third attempt; nothing left to retry
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(retrier.queued(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn oversized_body_is_rejected_with_500() {
    let mut config = RelayConfig::default();
    config.forward.target = "http://127.0.0.1:9".to_string();
    config.listener.max_body_size = 8;
    let (relay_addr, retrier, shutdown) = start_relay(config).await;

    let response = test_client()
        .post(format!("http://{relay_addr}/"))
        .body("definitely more than eight bytes")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(retrier.queued(), 0);

    shutdown.trigger();
}
