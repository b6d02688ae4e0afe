//! Full-stack scenarios: store + queue + polling source + reconciler +
//! controller, fetching from a local HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use confetch::{
    ConfigMap, ConfigStore, Controller, ControllerState, DedupQueue, HttpConfig, MemoryStore,
    PollingEventSource, ReconcileConfig, Reconciler, ReqwestFetcher,
};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use warp::Filter;

const DIRECTIVE_KEY: &str = "confetch.io/fetch";

async fn spawn_upstream() -> SocketAddr {
    let greeting = warp::path!("greeting").map(|| "hello there");
    let boom = warp::path!("boom")
        .map(|| warp::reply::with_status("oops", warp::http::StatusCode::INTERNAL_SERVER_ERROR));
    let (addr, server) = warp::serve(greeting.or(boom)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

struct Stack {
    stop_tx: watch::Sender<()>,
    handle: tokio::task::JoinHandle<ControllerState>,
}

impl Stack {
    fn launch(store: Arc<MemoryStore>) -> Self {
        let queue = Arc::new(DedupQueue::new());
        let fetcher = Arc::new(ReqwestFetcher::new(&HttpConfig::default()).unwrap());
        let source = Arc::new(PollingEventSource::new(
            store.clone(),
            queue.clone(),
            Duration::from_millis(20),
        ));
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            fetcher,
            &ReconcileConfig::default(),
        ));
        let mut controller = Controller::new(queue, source, reconciler);

        let (stop_tx, stop_rx) = watch::channel(());
        let handle = tokio::spawn(async move {
            controller.run(stop_rx).await.unwrap();
            controller.state()
        });

        Self { stop_tx, handle }
    }

    /// Fires the stop signal and waits for the loop to reach `Stopped`.
    async fn stop(self) -> ControllerState {
        self.stop_tx.send(()).unwrap();
        timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("controller should stop promptly")
            .unwrap()
    }
}

fn annotated(addr: SocketAddr, name: &str, directive: &str) -> ConfigMap {
    let mut record = ConfigMap::new("my-namespace", name);
    record.uid = format!("uid-{name}");
    record.annotations.insert(
        DIRECTIVE_KEY.to_string(),
        directive.replace("{addr}", &addr.to_string()),
    );
    record
}

#[tokio::test]
async fn test_directive_is_resolved_and_written_back() {
    let addr = spawn_upstream().await;

    let store = Arc::new(MemoryStore::new());
    store.insert(annotated(addr, "my-resource", "greeting=http://{addr}/greeting"));

    let stack = Stack::launch(store.clone());

    let mut resolved = false;
    for _ in 0..200 {
        let record = store.get("my-namespace", "my-resource").await.unwrap();
        if record.data.get("greeting").map(String::as_str) == Some("hello there") {
            resolved = true;
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(resolved, "fetched value never landed in the store");

    assert_eq!(stack.stop().await, ControllerState::Stopped);
    assert!(store.events_in("my-namespace").is_empty());
}

#[tokio::test]
async fn test_failing_upstream_produces_one_report_event() {
    let addr = spawn_upstream().await;

    let store = Arc::new(MemoryStore::new());
    store.insert(annotated(addr, "my-resource", "greeting=http://{addr}/boom"));

    let stack = Stack::launch(store.clone());

    let mut reported = false;
    for _ in 0..200 {
        if !store.events_in("my-namespace").is_empty() {
            reported = true;
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(reported, "no report event was created");

    assert_eq!(stack.stop().await, ControllerState::Stopped);

    let events = store.events_in("my-namespace");
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].message,
        format!("failed to curl http://{addr}/boom, got status code: 500")
    );
    assert_eq!(events[0].involved.name, "my-resource");

    // The failure left the record untouched.
    let record = store.get("my-namespace", "my-resource").await.unwrap();
    assert!(record.data.is_empty());
}

#[tokio::test]
async fn test_record_updated_mid_run_is_picked_up_again() {
    let addr = spawn_upstream().await;

    let store = Arc::new(MemoryStore::new());
    // Starts without any directive: the controller has nothing to do.
    let mut record = ConfigMap::new("my-namespace", "my-resource");
    record.uid = "uid-my-resource".to_string();
    store.insert(record.clone());

    let stack = Stack::launch(store.clone());
    sleep(Duration::from_millis(100)).await;
    assert!(store
        .get("my-namespace", "my-resource")
        .await
        .unwrap()
        .data
        .is_empty());

    // An external change adds the directive; the polling source re-observes.
    record.annotations.insert(
        DIRECTIVE_KEY.to_string(),
        format!("greeting=http://{addr}/greeting"),
    );
    store.insert(record);

    let mut resolved = false;
    for _ in 0..200 {
        let record = store.get("my-namespace", "my-resource").await.unwrap();
        if record.data.contains_key("greeting") {
            resolved = true;
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(resolved, "directive added mid-run was never resolved");

    assert_eq!(stack.stop().await, ControllerState::Stopped);
}
