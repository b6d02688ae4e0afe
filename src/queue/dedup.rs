use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;
use tracing::trace;

use super::WorkQueue;
use crate::ConfigMap;
use crate::ResourceRef;

#[derive(Debug, Default)]
struct QueueState {
    /// Pending keys in FIFO order; each key appears at most once
    order: VecDeque<ResourceRef>,
    /// Latest snapshot for each pending key
    items: HashMap<ResourceRef, ConfigMap>,
    /// Keys handed out by `get` and not yet `done`
    processing: HashSet<ResourceRef>,
    /// Snapshots added while their key was in flight; re-queued on `done`
    dirty: HashMap<ResourceRef, ConfigMap>,
    shutting_down: bool,
}

/// Work queue deduplicating by record identity.
///
/// A snapshot added while its key is already pending replaces the pending
/// snapshot in place. A snapshot added while its key is in flight is parked
/// and re-queued when the in-flight item is marked done, so an update
/// observed mid-reconcile is never lost.
#[derive(Debug, Default)]
pub struct DedupQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl DedupQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkQueue for DedupQueue {
    fn add(&self, item: ConfigMap) {
        let key = item.key();
        let mut state = self.state.lock();
        if state.shutting_down {
            trace!("queue shut down, dropping {}", key);
            return;
        }
        if state.processing.contains(&key) {
            state.dirty.insert(key, item);
        } else if state.items.contains_key(&key) {
            // Already pending: keep the queue position, refresh the snapshot.
            state.items.insert(key, item);
        } else {
            state.order.push_back(key.clone());
            state.items.insert(key, item);
        }
        drop(state);
        self.notify.notify_one();
    }

    async fn get(&self) -> Option<ConfigMap> {
        loop {
            // Register interest before inspecting state so a concurrent
            // add/shut_down between the check and the await still wakes us.
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock();
                if let Some(key) = state.order.pop_front() {
                    match state.items.remove(&key) {
                        Some(item) => {
                            state.processing.insert(key);
                            return Some(item);
                        }
                        None => continue,
                    }
                }
                if state.shutting_down {
                    return None;
                }
            }
            notified.await;
        }
    }

    fn done(&self, key: &ResourceRef) {
        let mut state = self.state.lock();
        state.processing.remove(key);
        if let Some(item) = state.dirty.remove(key) {
            state.order.push_back(key.clone());
            state.items.insert(key.clone(), item);
            drop(state);
            self.notify.notify_one();
        }
    }

    fn shut_down(&self) {
        let mut state = self.state.lock();
        if state.shutting_down {
            return;
        }
        debug!("work queue shutting down, {} pending", state.order.len());
        state.shutting_down = true;
        drop(state);
        self.notify.notify_waiters();
        // Cover a getter that raced past notify_waiters registration.
        self.notify.notify_one();
    }

    fn len(&self) -> usize {
        self.state.lock().order.len()
    }
}
