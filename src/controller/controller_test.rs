use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::Sequence;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio::time::timeout;

use super::*;
use crate::ConfigMap;
use crate::DedupQueue;
use crate::MockReconcile;
use crate::MockWorkQueue;
use crate::ReconcileError;
use crate::ReconcileOutcome;

/// Event source double that only finishes after the stop signal, strictly
/// later than the signal itself arrives.
struct SlowSource {
    runs: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
}

impl SlowSource {
    fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        (
            Self {
                runs: runs.clone(),
                finished: finished.clone(),
            },
            runs,
            finished,
        )
    }
}

#[async_trait]
impl EventSource for SlowSource {
    async fn run(&self, mut shutdown: watch::Receiver<()>) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let _ = shutdown.changed().await;
        sleep(Duration::from_millis(20)).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn record() -> ConfigMap {
    ConfigMap::new("my-namespace", "my-resource")
}

/// Queue double yielding the given snapshots, then reporting itself drained.
fn queue_yielding(items: Vec<ConfigMap>) -> MockWorkQueue {
    let mut queue = MockWorkQueue::new();
    let mut seq = Sequence::new();
    for item in items {
        queue
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Some(item.clone()));
    }
    queue
        .expect_get()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| None);
    queue
}

#[tokio::test]
async fn test_run_processes_one_item_then_shuts_down_in_order() {
    let item = record();
    let key = item.key();

    let mut queue = queue_yielding(vec![item.clone()]);
    let done_key = key.clone();
    queue
        .expect_done()
        .times(1)
        .withf(move |k| *k == done_key)
        .return_const(());
    queue.expect_shut_down().times(1).return_const(());

    let (source, runs, finished) = SlowSource::new();

    let mut reconciler = MockReconcile::new();
    let expected = item.clone();
    reconciler
        .expect_reconcile()
        .times(1)
        .withf(move |r| *r == expected)
        .returning(|_| Ok(ReconcileOutcome::Updated));

    let mut controller = Controller::new(Arc::new(queue), Arc::new(source), Arc::new(reconciler));
    assert_eq!(controller.state(), ControllerState::Idle);

    let (_stop_tx, stop_rx) = watch::channel(());
    controller.run(stop_rx).await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    // run only returns once the source task has finished.
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(controller.state(), ControllerState::Stopped);
}

#[tokio::test]
async fn test_malformed_queue_item_is_marked_done_without_reconciling() {
    let malformed = ConfigMap::new("", "");

    let mut queue = queue_yielding(vec![malformed.clone()]);
    queue
        .expect_done()
        .times(1)
        .withf(move |k| *k == malformed.key())
        .return_const(());
    queue.expect_shut_down().times(1).return_const(());

    let (source, _, _) = SlowSource::new();

    let mut reconciler = MockReconcile::new();
    reconciler.expect_reconcile().never();

    let mut controller = Controller::new(Arc::new(queue), Arc::new(source), Arc::new(reconciler));
    let (_stop_tx, stop_rx) = watch::channel(());
    controller.run(stop_rx).await.unwrap();

    assert_eq!(controller.state(), ControllerState::Stopped);
}

#[tokio::test]
async fn test_failed_reconcile_is_marked_done_and_not_reenqueued() {
    let first = ConfigMap::new("my-namespace", "first");
    let second = ConfigMap::new("my-namespace", "second");

    let mut queue = queue_yielding(vec![first.clone(), second.clone()]);
    queue.expect_done().times(2).return_const(());
    queue.expect_shut_down().times(1).return_const(());

    let (source, _, _) = SlowSource::new();

    let mut reconciler = MockReconcile::new();
    let mut seq = Sequence::new();
    reconciler
        .expect_reconcile()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Err(ReconcileError::FetchStatus {
                url: "https://example.com/".to_string(),
                status: 500,
            })
        });
    reconciler
        .expect_reconcile()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(ReconcileOutcome::Unchanged));

    let mut controller = Controller::new(Arc::new(queue), Arc::new(source), Arc::new(reconciler));
    let (_stop_tx, stop_rx) = watch::channel(());
    // The queue mock enforces exactly three gets: a failure never re-enqueues.
    controller.run(stop_rx).await.unwrap();

    assert_eq!(controller.state(), ControllerState::Stopped);
}

#[tokio::test]
async fn test_stop_signal_breaks_an_idle_worker_loop() {
    // Real queue, empty: the worker blocks in get until the signal fires.
    let queue = Arc::new(DedupQueue::new());
    let (source, _, finished) = SlowSource::new();

    let mut reconciler = MockReconcile::new();
    reconciler.expect_reconcile().never();

    let mut controller = Controller::new(queue.clone(), Arc::new(source), Arc::new(reconciler));
    let (stop_tx, stop_rx) = watch::channel(());

    let handle = tokio::spawn(async move {
        controller.run(stop_rx).await.map(|()| controller.state())
    });
    tokio::task::yield_now().await;

    stop_tx.send(()).unwrap();
    let state = timeout(Duration::from_secs(1), handle)
        .await
        .expect("run should return after the stop signal")
        .unwrap()
        .unwrap();

    assert_eq!(state, ControllerState::Stopped);
    assert!(finished.load(Ordering::SeqCst));
    // Draining shut the queue down: post-shutdown gets drain to None.
    assert!(queue.get().await.is_none());
}
