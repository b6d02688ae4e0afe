//! The controller loop: owns the work queue lifecycle, drives the reconciler
//! and coordinates shutdown between the event source task and the worker.
//!
//! ## Key Responsibilities
//! - Runs the event source on its own task until the stop signal fires
//! - Drains the work queue sequentially on the calling task (single worker)
//! - Applies the retry-less policy: failed reconciles are logged and marked
//!   done, never re-enqueued
//! - Orders shutdown: queue shutdown before the wait for the source task

#[cfg(test)]
mod controller_test;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::metrics;
use crate::utils::task::spawn_task;
use crate::ConfigMap;
use crate::EventSource;
use crate::Reconcile;
use crate::Result;
use crate::WorkQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Draining,
    Stopped,
}

pub struct Controller<Q, E, R>
where
    Q: WorkQueue,
    E: EventSource,
    R: Reconcile,
{
    queue: Arc<Q>,
    source: Arc<E>,
    reconciler: Arc<R>,
    state: ControllerState,
}

impl<Q, E, R> Controller<Q, E, R>
where
    Q: WorkQueue,
    E: EventSource,
    R: Reconcile,
{
    pub fn new(queue: Arc<Q>, source: Arc<E>, reconciler: Arc<R>) -> Self {
        Self {
            queue,
            source,
            reconciler,
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Runs until the stop signal fires or the queue reports itself drained,
    /// then coordinates shutdown. Returns only after the event source task
    /// has finished.
    pub async fn run(&mut self, mut stop: watch::Receiver<()>) -> Result<()> {
        self.transition(ControllerState::Running);

        // The source gets its own stop channel so the drain phase below can
        // signal it after the queue has shut down.
        let (source_stop_tx, source_stop_rx) = watch::channel(());
        let source = self.source.clone();
        let source_handle = spawn_task("event-source", move || async move {
            source.run(source_stop_rx).await
        });

        let queue = self.queue.clone();
        loop {
            tokio::select! {
                biased;
                _ = stop.changed() => {
                    info!("controller received stop signal");
                    break;
                }
                item = queue.get() => {
                    match item {
                        Some(item) => self.process(item).await,
                        None => {
                            debug!("work queue drained");
                            break;
                        }
                    }
                }
            }
        }

        self.transition(ControllerState::Draining);
        self.queue.shut_down();
        if source_stop_tx.send(()).is_err() {
            debug!("event source already finished");
        }
        source_handle.await?;
        self.transition(ControllerState::Stopped);

        Ok(())
    }

    /// Handles one dequeued snapshot. The item is always marked done so the
    /// queue releases its in-flight tracking, success or failure.
    async fn process(&self, item: ConfigMap) {
        let key = item.key();
        if !key.is_well_formed() {
            warn!("dropping malformed queue item '{}'", key);
            self.queue.done(&key);
            return;
        }

        metrics::RECONCILE_ATTEMPTS
            .with_label_values(&[key.namespace.as_str()])
            .inc();
        match self.reconciler.reconcile(&item).await {
            Ok(outcome) => debug!("reconciled {}: {:?}", key, outcome),
            Err(e) => {
                metrics::RECONCILE_FAILURES
                    .with_label_values(&[key.namespace.as_str()])
                    .inc();
                // Not retried and not re-enqueued: a transient failure is only
                // corrected by a subsequent change to the record.
                error!("failed to process {}: {}", key, e);
            }
        }
        self.queue.done(&key);
    }

    fn transition(&mut self, next: ControllerState) {
        debug!("controller state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
