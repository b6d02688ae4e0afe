use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

use super::ConfigStore;
use crate::ConfigMap;
use crate::ReportEvent;
use crate::ResourceRef;
use crate::StoreError;

/// In-memory store implementation.
///
/// Backs the [`ConfigStore`] contract for tests and single-process
/// deployments. All operations are safe for concurrent use from the event
/// source task and the worker loop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<ResourceRef, ConfigMap>,
    events: RwLock<Vec<(String, ReportEvent)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, replacing any previous version under the same key.
    pub fn insert(&self, record: ConfigMap) {
        self.records.insert(record.key(), record);
    }

    pub fn remove(&self, key: &ResourceRef) -> Option<ConfigMap> {
        self.records.remove(key).map(|(_, record)| record)
    }

    /// Report events created in `namespace`, in creation order.
    pub fn events_in(&self, namespace: &str) -> Vec<ReportEvent> {
        self.events
            .read()
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<ConfigMap, StoreError> {
        let key = ResourceRef::new(namespace, name);
        self.records
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(&self) -> std::result::Result<Vec<ConfigMap>, StoreError> {
        let mut records: Vec<ConfigMap> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Deterministic order keeps snapshot diffs and tests stable.
        records.sort_by(|a, b| a.key().to_string().cmp(&b.key().to_string()));
        Ok(records)
    }

    async fn update(
        &self,
        record: &ConfigMap,
    ) -> std::result::Result<(), StoreError> {
        let key = record.key();
        match self.records.get_mut(&key) {
            Some(mut entry) => {
                trace!("updating record {}", key);
                *entry.value_mut() = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                namespace: record.namespace.clone(),
                name: record.name.clone(),
            }),
        }
    }

    async fn create_event(
        &self,
        namespace: &str,
        event: ReportEvent,
    ) -> std::result::Result<(), StoreError> {
        self.events
            .write()
            .push((namespace.to_string(), event));
        Ok(())
    }
}
