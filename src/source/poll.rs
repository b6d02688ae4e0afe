use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::EventSource;
use crate::ConfigMap;
use crate::ConfigStore;
use crate::ResourceRef;
use crate::Result;
use crate::StoreError;
use crate::WorkQueue;

/// Event source that approximates a change feed by re-listing the store.
///
/// The first pass enqueues the full snapshot; subsequent passes enqueue only
/// records that are new or differ from the last snapshot seen. Duplicate
/// pushes are absorbed by the queue's dedup and the reconciler's idempotence.
pub struct PollingEventSource<S, Q>
where
    S: ConfigStore,
    Q: WorkQueue,
{
    store: Arc<S>,
    queue: Arc<Q>,
    poll_interval: Duration,
    known: Mutex<HashMap<ResourceRef, ConfigMap>>,
}

impl<S, Q> PollingEventSource<S, Q>
where
    S: ConfigStore,
    Q: WorkQueue,
{
    pub fn new(store: Arc<S>, queue: Arc<Q>, poll_interval: Duration) -> Self {
        Self {
            store,
            queue,
            poll_interval,
            known: Mutex::new(HashMap::new()),
        }
    }

    /// One list pass: enqueue new/changed records, forget deleted ones.
    /// Returns the number of records pushed.
    pub(crate) async fn scan(&self) -> std::result::Result<usize, StoreError> {
        let records = self.store.list().await?;

        let mut known = self.known.lock();
        let mut pushed = 0;

        let mut seen: HashMap<ResourceRef, ConfigMap> = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.key();
            let changed = match known.get(&key) {
                Some(prev) => *prev != record,
                None => true,
            };
            if changed {
                debug!("observed change on {}", key);
                self.queue.add(record.clone());
                pushed += 1;
            }
            seen.insert(key, record);
        }
        *known = seen;

        Ok(pushed)
    }
}

#[async_trait]
impl<S, Q> EventSource for PollingEventSource<S, Q>
where
    S: ConfigStore,
    Q: WorkQueue,
{
    async fn run(&self, mut shutdown: watch::Receiver<()>) -> Result<()> {
        info!("event source started, poll interval {:?}", self.poll_interval);
        loop {
            if let Err(e) = self.scan().await {
                warn!("listing records failed: {}", e);
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("event source received stop signal");
                    return Ok(());
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}
